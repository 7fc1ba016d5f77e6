use std::sync::Arc;
use validator::Validate;

use super::models::{CreateTaskRequest, Task, UpdateTaskRequest};
use super::repository::TaskRepository;
use crate::error::ServiceError;

/// Personal to-do list, one per user
pub struct TaskBook {
    repo: Arc<dyn TaskRepository>,
}

impl TaskBook {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Task>, ServiceError> {
        self.repo.list(owner).await
    }

    pub async fn create(&self, owner: &str, req: CreateTaskRequest) -> Result<Task, ServiceError> {
        let req = req.trimmed();
        req.validate()?;
        let task = self.repo.insert(owner, &req.title).await?;
        tracing::debug!(owner, task_id = task.id, "Task created");
        Ok(task)
    }

    pub async fn update(
        &self,
        owner: &str,
        id: i64,
        req: UpdateTaskRequest,
    ) -> Result<Task, ServiceError> {
        let req = req.trimmed();
        req.validate()?;
        self.repo
            .update(owner, id, req.title.as_deref(), req.completed)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    pub async fn delete(&self, owner: &str, id: i64) -> Result<(), ServiceError> {
        if !self.repo.delete(owner, id).await? {
            return Err(task_not_found(id));
        }
        tracing::debug!(owner, task_id = id, "Task deleted");
        Ok(())
    }
}

fn task_not_found(id: i64) -> ServiceError {
    ServiceError::not_found(format!("Task {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::repository::memory::MemoryTaskRepository;

    fn book() -> TaskBook {
        TaskBook::new(Arc::new(MemoryTaskRepository::new()))
    }

    fn create(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_per_owner() {
        let book = book();
        book.create("a@x.com", create("  first ")).await.unwrap();
        book.create("a@x.com", create("second")).await.unwrap();
        book.create("b@x.com", create("other")).await.unwrap();

        let titles: Vec<String> = book
            .list("a@x.com")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        assert!(matches!(
            book().create("a@x.com", create("  ")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let book = book();
        let task = book.create("a@x.com", create("draft")).await.unwrap();

        let done = book
            .update(
                "a@x.com",
                task.id,
                UpdateTaskRequest {
                    title: Some("".into()),
                    completed: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.title, "draft");
        assert!(done.completed);

        let renamed = book
            .update(
                "a@x.com",
                task.id,
                UpdateTaskRequest {
                    title: Some("final".into()),
                    completed: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title, "final");
        assert!(renamed.completed);
    }

    #[tokio::test]
    async fn test_foreign_task_is_not_found() {
        let book = book();
        let task = book.create("a@x.com", create("mine")).await.unwrap();

        assert!(matches!(
            book.update("b@x.com", task.id, UpdateTaskRequest::default())
                .await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            book.delete("b@x.com", task.id).await,
            Err(ServiceError::NotFound(_))
        ));

        book.delete("a@x.com", task.id).await.unwrap();
        assert!(book.list("a@x.com").await.unwrap().is_empty());
    }
}
