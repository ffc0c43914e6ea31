#[cfg(test)]
mod tests {
    use crate::store::entity::user;
    use crate::store::postgres::{PostgresPostStore, PostgresUserStore};
    use forno_core::domain::Role;
    use forno_core::error::RepoError;
    use forno_core::ports::{PostRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_find_user_by_email() {
        let user_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user::Model {
                id: user_id,
                username: "chef".to_owned(),
                email: "chef@forno.dev".to_owned(),
                password_hash: "hash".to_owned(),
                role: "admin".to_owned(),
                is_active: true,
                last_login: None,
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserStore::new(db);

        let found = repo.find_by_email("chef@forno.dev").await.unwrap().unwrap();
        assert_eq!(found.id, user_id);
        assert_eq!(found.role, Role::Admin);
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostStore::new(db);

        let result = repo.delete(uuid::Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_view_bump_of_missing_post_yields_none() {
        // The UPDATE touches no row, so the read never happens.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostStore::new(db);

        let result = repo.find_detail(uuid::Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }
}
