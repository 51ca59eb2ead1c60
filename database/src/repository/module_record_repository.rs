use std::sync::Arc;

use sqlx::{Pool, Sqlite};

use crate::database_error::DatabaseError;

/// Access to the per-module-type tables that hold indirect file references.
#[derive(Debug)]
pub struct ModuleRecordRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl ModuleRecordRepository {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    pub async fn add_resource(&self, name: &str, main_file: Option<&str>) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO resource (name, main_file) VALUES (?, ?)")
            .bind(name)
            .bind(main_file)
            .execute(&*self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn set_resource_main_file(
        &self,
        resource_id: i64,
        main_file: Option<&str>,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE resource SET main_file = ? WHERE id = ?")
            .bind(main_file)
            .bind(resource_id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    /// `None` when the resource record does not exist, `Some(None)` when it has no main file.
    pub async fn get_resource_main_file(
        &self,
        resource_id: i64,
    ) -> Result<Option<Option<String>>, DatabaseError> {
        let main_file: Option<Option<String>> =
            sqlx::query_scalar("SELECT main_file FROM resource WHERE id = ?")
                .bind(resource_id)
                .fetch_optional(&*self.pool)
                .await?;
        Ok(main_file)
    }

    pub async fn add_book_chapter(&self, book_id: i64, title: &str) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO book_chapters (book_id, title) VALUES (?, ?)")
            .bind(book_id)
            .bind(title)
            .execute(&*self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn delete_book_chapter(&self, chapter_id: i64) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM book_chapters WHERE id = ?")
            .bind(chapter_id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_book_chapter_ids(&self, book_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let ids = sqlx::query_scalar("SELECT id FROM book_chapters WHERE book_id = ? ORDER BY id")
            .bind(book_id)
            .fetch_all(&*self.pool)
            .await?;
        Ok(ids)
    }

    pub async fn add_forum_discussion(&self, forum_id: i64, name: &str) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO forum_discussions (forum_id, name) VALUES (?, ?)")
            .bind(forum_id)
            .bind(name)
            .execute(&*self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn add_forum_post(&self, discussion_id: i64, subject: &str) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO forum_posts (discussion_id, subject) VALUES (?, ?)")
            .bind(discussion_id)
            .bind(subject)
            .execute(&*self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Ids of every post in every discussion of the forum.
    pub async fn get_forum_post_ids(&self, forum_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let ids = sqlx::query_scalar(
            "SELECT DISTINCT fp.id
             FROM forum_posts fp
             JOIN forum_discussions fd ON fp.discussion_id = fd.id
             WHERE fd.forum_id = ?
             ORDER BY fp.id",
        )
        .bind(forum_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn add_glossary_entry(&self, glossary_id: i64, concept: &str) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO glossary_entries (glossary_id, concept) VALUES (?, ?)")
            .bind(glossary_id)
            .bind(concept)
            .execute(&*self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_glossary_entry_ids(&self, glossary_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let ids = sqlx::query_scalar(
            "SELECT id FROM glossary_entries WHERE glossary_id = ? ORDER BY id",
        )
        .bind(glossary_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use crate::setup_test_db;

    use super::*;

    #[async_std::test]
    async fn test_resource_main_file() {
        let pool = Arc::new(setup_test_db().await);
        let repository = ModuleRecordRepository::new(pool);

        let resource_id = repository.add_resource("Notes", Some("notes.pdf")).await.unwrap();
        assert_eq!(
            repository.get_resource_main_file(resource_id).await.unwrap(),
            Some(Some("notes.pdf".to_string()))
        );

        repository.set_resource_main_file(resource_id, None).await.unwrap();
        assert_eq!(
            repository.get_resource_main_file(resource_id).await.unwrap(),
            Some(None)
        );

        assert_eq!(repository.get_resource_main_file(999).await.unwrap(), None);
    }

    #[async_std::test]
    async fn test_forum_post_ids_are_joined_through_discussions() {
        let pool = Arc::new(setup_test_db().await);
        let repository = ModuleRecordRepository::new(pool);

        let discussion_1 = repository.add_forum_discussion(1, "Week 1").await.unwrap();
        let discussion_2 = repository.add_forum_discussion(1, "Week 2").await.unwrap();
        let other_forum_discussion = repository.add_forum_discussion(2, "Other").await.unwrap();

        let post_1 = repository.add_forum_post(discussion_1, "Hello").await.unwrap();
        let post_2 = repository.add_forum_post(discussion_2, "Re: Hello").await.unwrap();
        repository
            .add_forum_post(other_forum_discussion, "Elsewhere")
            .await
            .unwrap();

        let post_ids = repository.get_forum_post_ids(1).await.unwrap();
        assert_eq!(post_ids, vec![post_1, post_2]);
    }

    #[async_std::test]
    async fn test_book_chapters_and_glossary_entries() {
        let pool = Arc::new(setup_test_db().await);
        let repository = ModuleRecordRepository::new(pool);

        let chapter_1 = repository.add_book_chapter(7, "Intro").await.unwrap();
        let chapter_2 = repository.add_book_chapter(7, "Methods").await.unwrap();
        repository.add_book_chapter(8, "Other book").await.unwrap();
        assert_eq!(
            repository.get_book_chapter_ids(7).await.unwrap(),
            vec![chapter_1, chapter_2]
        );

        repository.delete_book_chapter(chapter_1).await.unwrap();
        assert_eq!(repository.get_book_chapter_ids(7).await.unwrap(), vec![chapter_2]);

        let entry = repository.add_glossary_entry(3, "Mitosis").await.unwrap();
        assert_eq!(repository.get_glossary_entry_ids(3).await.unwrap(), vec![entry]);
        assert!(repository.get_glossary_entry_ids(4).await.unwrap().is_empty());
    }
}
