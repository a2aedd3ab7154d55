#[cfg(test)]
mod tests {
    use crate::context::{Context, ContextError};
    use crate::runner::{Database, DriverError};
    use crate::testutil::{FakeDb, RecordingReceiver, SharedDb};
    use crate::{
        Connection, Connector, Dialect, Error, Executer, FromRow, LoadError, Loader, Receiver,
        Row, SessionRunner, SqlValue, args, eq, open,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingConnector {
        db: SharedDb,
        calls: AtomicUsize,
    }

    impl Connector for CountingConnector {
        fn connect(&self, _driver: &str, _dsn: &str) -> Result<Arc<dyn Database>, DriverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(self.db.clone()))
        }
    }

    #[derive(Debug, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    impl FromRow for User {
        fn from_row(row: &Row) -> Result<Self, LoadError> {
            Ok(Self {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        }
    }

    fn users_db() -> Arc<FakeDb> {
        Arc::new(FakeDb::with_rows(
            &["id", "name"],
            vec![
                vec![SqlValue::I64(1), SqlValue::from("ann")],
                vec![SqlValue::I64(2), SqlValue::from("ben")],
            ],
        ))
    }

    fn connect(db: Arc<FakeDb>, dialect: Dialect) -> (Arc<RecordingReceiver>, Connection) {
        let rec = Arc::new(RecordingReceiver::default());
        let conn = Connection::new(
            Arc::new(SharedDb(db)),
            dialect,
            Receiver::plain_arc(rec.clone()),
        );
        (rec, conn)
    }

    #[test]
    fn open_rejects_unknown_driver_before_connecting() {
        let connector = CountingConnector::default();
        let err = open("oracle", "dsn", None, &connector).unwrap_err();
        assert!(matches!(err, Error::NotSupported(ref d) if d == "oracle"));
        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);

        let conn = open("postgres", "dsn", None, &connector).unwrap();
        assert_eq!(conn.dialect(), Dialect::PostgreSQL);
        assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn sessions_inherit_connection_receiver() {
        let (_rec, conn) = connect(Arc::default(), Dialect::MySQL);
        let sess = conn.new_session(None);
        assert!(sess.receiver().ptr_eq(conn.receiver()));

        let child = sess.new_session(None);
        assert!(child.receiver().ptr_eq(conn.receiver()));

        let own = conn.new_session(Some(Receiver::null()));
        assert!(!own.receiver().ptr_eq(conn.receiver()));
        assert!(own.new_session(None).receiver().ptr_eq(own.receiver()));
    }

    #[test]
    fn load_structs_and_values() {
        let db = users_db();
        let (rec, conn) = connect(db.clone(), Dialect::PostgreSQL);
        let sess = conn.new_session(None);

        let mut users: Vec<User> = Vec::new();
        let n = sess
            .select(["id", "name"])
            .from("users")
            .where_cond(eq("active", true))
            .load_structs(&mut users)
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            users[1],
            User {
                id: 2,
                name: "ben".to_string()
            }
        );
        assert_eq!(
            db.calls()[0].query,
            r#"SELECT "id", "name" FROM "users" WHERE "active" = $1"#
        );

        let first: User = sess.select("*").from("users").load_struct().unwrap();
        assert_eq!(first.name, "ann");

        let id: i64 = sess.select("id").from("users").load_value().unwrap();
        assert_eq!(id, 1);

        let mut ids: Vec<i64> = Vec::new();
        sess.select_by_sql("SELECT id FROM users", args![])
            .load_values(&mut ids)
            .unwrap();
        assert_eq!(ids, vec![1, 2]);

        assert_eq!(rec.timings().len(), 4);
    }

    #[test]
    fn load_struct_without_rows_is_not_found() {
        let (_rec, conn) = connect(Arc::default(), Dialect::MySQL);
        let sess = conn.new_session(None);
        let err = sess
            .select("id")
            .from("users")
            .load_struct::<i64>()
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn writes_through_session() {
        let db: Arc<FakeDb> = Arc::default();
        let (rec, conn) = connect(db.clone(), Dialect::SQLite);
        let sess = conn.new_session(None);

        sess.insert_into("users")
            .pair("name", "cid")
            .exec()
            .unwrap();
        sess.update("users")
            .set("name", "dee")
            .where_("id = ?", [1_i64])
            .exec()
            .unwrap();
        sess.delete_from("users")
            .where_("id = ?", [2_i64])
            .exec()
            .unwrap();
        sess.update_by_sql("UPDATE users SET n = n + ?", [1_i64])
            .exec()
            .unwrap();
        sess.delete_by_sql("DELETE FROM users", args![]).exec().unwrap();
        sess.insert_by_sql("INSERT INTO users (name) VALUES (?)", ["eve"])
            .exec()
            .unwrap();

        let queries: Vec<String> = db.calls().into_iter().map(|c| c.query).collect();
        assert_eq!(
            queries,
            vec![
                r#"INSERT INTO "users" ("name") VALUES (?)"#,
                r#"UPDATE "users" SET "name" = ? WHERE id = ?"#,
                r#"DELETE FROM "users" WHERE id = ?"#,
                "UPDATE users SET n = n + ?",
                "DELETE FROM users",
                "INSERT INTO users (name) VALUES (?)",
            ]
        );
        assert_eq!(rec.timings(), vec!["dbr.exec"; 6]);
    }

    #[test]
    fn insert_returning_can_load() {
        let db = Arc::new(FakeDb::with_rows(&["id"], vec![vec![SqlValue::I64(42)]]));
        let (_rec, conn) = connect(db.clone(), Dialect::PostgreSQL);
        let sess = conn.new_session(None);
        let id: i64 = sess
            .insert_into("users")
            .pair("name", "fay")
            .returning("id")
            .load_value()
            .unwrap();
        assert_eq!(id, 42);
        assert_eq!(db.calls()[0].kind, "query");
    }

    #[test]
    fn unbound_statement_cannot_run() {
        let mut ins = crate::InsertStmt::new("t");
        ins.pair("a", 1_i64);
        assert!(matches!(ins.exec(), Err(Error::Unbound)));

        let mut s = crate::SelectStmt::new("a");
        s.from("t");
        assert!(matches!(s.load_value::<i64>(), Err(Error::Unbound)));
    }

    #[test]
    fn session_context_reaches_driver() {
        let (_rec, conn) = connect(Arc::default(), Dialect::MySQL);
        let (ctx, cancel) = Context::background().with_cancel();
        let sess = conn.new_session_context(ctx, None);
        cancel.cancel();

        let err = sess.delete_from("t").exec().unwrap_err();
        assert_eq!(
            err.driver_error().unwrap().downcast_ref::<ContextError>(),
            Some(&ContextError::Canceled)
        );

        // 显式传入的 Context 优先
        let res = sess
            .delete_from("t")
            .exec_context(&Context::background())
            .unwrap();
        assert_eq!(res.rows_affected, 1);
    }

    #[test]
    fn transaction_commit_flow() {
        let db: Arc<FakeDb> = Arc::default();
        let (rec, conn) = connect(db.clone(), Dialect::MySQL);
        let sess = conn.new_session(None);

        let tx = sess.begin().unwrap();
        tx.insert_into("t").pair("a", 1_i64).exec().unwrap();
        tx.commit().unwrap();
        assert!(tx.is_done());
        assert!(matches!(tx.commit(), Err(Error::TxDone)));
        tx.rollback_unless_committed();

        assert_eq!(db.commits.load(Ordering::SeqCst), 1);
        assert_eq!(db.rollbacks.load(Ordering::SeqCst), 0);
        assert_eq!(rec.events(), vec!["dbr.begin", "dbr.commit"]);
        assert_eq!(rec.timings(), vec!["dbr.exec"]);
        assert!(tx.receiver().ptr_eq(sess.receiver()));
    }

    #[test]
    fn transaction_rollback_unless_committed() {
        let db: Arc<FakeDb> = Arc::default();
        let (rec, conn) = connect(db.clone(), Dialect::MySQL);
        let tx = conn.new_session(None).begin().unwrap();
        tx.rollback_unless_committed();
        tx.rollback_unless_committed();

        assert_eq!(db.rollbacks.load(Ordering::SeqCst), 1);
        assert_eq!(rec.events(), vec!["dbr.begin", "dbr.rollback"]);
        assert!(matches!(tx.rollback(), Err(Error::TxDone)));
    }

    #[test]
    fn transaction_driver_failures() {
        let db = Arc::new(FakeDb {
            fail_begin: Some("no conn".to_string()),
            ..FakeDb::default()
        });
        let (rec, conn) = connect(db, Dialect::MySQL);
        assert!(matches!(conn.new_session(None).begin(), Err(Error::Driver(_))));
        assert_eq!(rec.errors(), vec!["dbr.begin.error"]);

        let db = Arc::new(FakeDb {
            fail_commit: Some("lost".to_string()),
            ..FakeDb::default()
        });
        let (rec, conn) = connect(db, Dialect::MySQL);
        let tx = conn.new_session(None).begin().unwrap();
        let err = tx.commit().unwrap_err();
        assert_eq!(err.to_string(), "fake driver: lost");
        assert_eq!(rec.errors(), vec!["dbr.commit.error"]);
    }
}
