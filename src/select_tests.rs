#[cfg(test)]
mod tests {
    use crate::{
        Builder, Dialect, InterpolateError, SelectStmt, SqlValue, gt, in_, list, raw,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn select_all_clauses() {
        let mut s = SelectStmt::new(["users.id", "users.name"]);
        s.distinct()
            .from("users")
            .join("orders", "orders.user_id = users.id")
            .where_cond(gt("orders.total", 100_i64))
            .group_by("users.id")
            .having("COUNT(*) > ?", [1_i64])
            .order_asc("users.name")
            .paginate(3, 10);

        let (sql, values) = s.to_sql(Dialect::MySQL).unwrap();
        assert_eq!(
            sql,
            "SELECT DISTINCT `users`.`id`, `users`.`name` FROM `users` \
             JOIN `orders` ON orders.user_id = users.id \
             WHERE `orders`.`total` > ? GROUP BY `users`.`id` \
             HAVING COUNT(*) > ? ORDER BY `users`.`name` ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(values, vec![SqlValue::I64(100), SqlValue::I64(1)]);
    }

    #[test]
    fn join_kinds() {
        let mut s = SelectStmt::new("*");
        s.from("a")
            .left_join("b", "b.a_id = a.id")
            .right_join("c", "c.a_id = a.id")
            .full_join("d", "d.a_id = a.id");
        let (sql, _) = s.to_sql(Dialect::PostgreSQL).unwrap();
        assert_eq!(
            sql,
            r#"SELECT * FROM "a" LEFT JOIN "b" ON b.a_id = a.id RIGHT JOIN "c" ON c.a_id = a.id FULL JOIN "d" ON d.a_id = a.id"#
        );
    }

    #[test]
    fn multiple_where_are_anded_and_wrapped() {
        let mut s = SelectStmt::new("id");
        s.from("t").where_("a = ?", [1_i64]).where_("b = ? OR c = ?", [2_i64, 3]);
        let (sql, _) = s.to_sql(Dialect::PostgreSQL).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "id" FROM "t" WHERE (a = $1) AND (b = $2 OR c = $3)"#
        );
    }

    #[test]
    fn from_subquery_with_alias() {
        let mut sub = SelectStmt::new("a");
        sub.from("x").where_("a > ?", [0_i64]);
        let mut s = SelectStmt::new("a");
        s.from_select(sub, "t").where_cond(in_("a", list([1_i64, 2])));

        let (sql, values) = s.to_sql(Dialect::MySQL).unwrap();
        assert_eq!(
            sql,
            "SELECT `a` FROM (SELECT `a` FROM `x` WHERE a > ?) AS `t` WHERE `a` IN (?, ?)"
        );
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn expression_columns_and_raw_order() {
        let mut s = SelectStmt::new(Vec::<String>::new());
        s.column_expr(raw("COUNT(*)"))
            .from("t")
            .order_by("FIELD(id, 3, 1)")
            .order_desc("created_at")
            .limit(5);
        let (sql, values) = s.to_sql(Dialect::SQLite).unwrap();
        assert_eq!(
            sql,
            r#"SELECT COUNT(*) FROM "t" ORDER BY FIELD(id, 3, 1), "created_at" DESC LIMIT 5"#
        );
        assert!(values.is_empty());
    }

    #[test]
    fn for_update_skipped_on_sqlite() {
        let mut s = SelectStmt::new("id");
        s.from("t").where_("id = ?", [1_i64]).for_update();
        assert_eq!(
            s.to_sql(Dialect::MySQL).unwrap().0,
            "SELECT `id` FROM `t` WHERE id = ? FOR UPDATE"
        );
        assert_eq!(
            s.to_sql(Dialect::SQLite).unwrap().0,
            r#"SELECT "id" FROM "t" WHERE id = ?"#
        );
    }

    #[test]
    fn select_without_columns_fails() {
        let mut s = SelectStmt::new(Vec::<String>::new());
        s.from("t");
        assert_eq!(
            s.to_sql(Dialect::MySQL),
            Err(InterpolateError::ColumnNotSpecified)
        );
    }

    #[test]
    fn select_by_sql_uses_raw_text() {
        let s = SelectStmt::by_sql("SELECT * FROM t WHERE id = ? AND k = ?", [1_i64, 2]);
        let (sql, values) = s.to_sql(Dialect::PostgreSQL).unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE id = $1 AND k = $2");
        assert_eq!(values, vec![SqlValue::I64(1), SqlValue::I64(2)]);
    }

    #[test]
    fn column_names_are_identifiers() {
        let mut s = SelectStmt::new("id");
        s.column("name")
            .column(["users.email", "age"])
            .column_expr(raw("NOW()"))
            .from("users");
        let (sql, values) = s.to_sql(Dialect::MySQL).unwrap();
        assert_eq!(
            sql,
            "SELECT `id`, `name`, `users`.`email`, `age`, NOW() FROM `users`"
        );
        assert!(values.is_empty());
    }

    #[test]
    fn paginate_saturates_on_huge_pages() {
        let mut s = SelectStmt::new("id");
        s.from("t").paginate(u64::MAX, 1000);
        assert_eq!(
            s.to_sql(Dialect::MySQL).unwrap().0,
            format!("SELECT `id` FROM `t` LIMIT 1000 OFFSET {}", u64::MAX)
        );
    }

    #[test]
    fn paginate_first_page_has_zero_offset() {
        let mut s = SelectStmt::new("id");
        s.from("t").paginate(1, 25);
        assert_eq!(
            s.to_sql(Dialect::MySQL).unwrap().0,
            "SELECT `id` FROM `t` LIMIT 25 OFFSET 0"
        );
    }
}
