use crate::api::HttpError;
use std::future::Future;
use tokio::sync::oneshot;

/// One background request whose result a view collects on tick
#[derive(Debug)]
pub struct Task<T> {
  rx: Option<oneshot::Receiver<Result<T, HttpError>>>,
}

impl<T> Default for Task<T> {
  fn default() -> Self {
    Self { rx: None }
  }
}

impl<T: Send + 'static> Task<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_running(&self) -> bool {
    self.rx.is_some()
  }

  /// Start `job` unless one is already running
  pub fn spawn<F>(&mut self, job: F) -> bool
  where
    F: Future<Output = Result<T, HttpError>> + Send + 'static,
  {
    if self.is_running() {
      return false;
    }
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(job.await);
    });
    self.rx = Some(rx);
    true
  }

  /// The result, once it has landed. A job that died without answering
  /// reports an error.
  pub fn poll(&mut self) -> Option<Result<T, HttpError>> {
    let rx = self.rx.as_mut()?;
    let result = match rx.try_recv() {
      Ok(result) => result,
      Err(oneshot::error::TryRecvError::Empty) => return None,
      Err(oneshot::error::TryRecvError::Closed) => Err(HttpError::Network(
        "background task ended without a result".to_string(),
      )),
    };
    self.rx = None;
    Some(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn test_result_is_collected_once() {
    let mut task = Task::new();
    assert!(task.spawn(async {
      tokio::time::sleep(Duration::from_millis(5)).await;
      Ok(7)
    }));
    assert!(!task.spawn(async { Ok(8) }));
    assert_eq!(task.poll(), None);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(task.poll(), Some(Ok(7)));
    assert_eq!(task.poll(), None);
    assert!(!task.is_running());
  }

  #[tokio::test]
  async fn test_panicked_job_reports_an_error() {
    let mut task: Task<u8> = Task::new();
    task.spawn(async {
      if true {
        panic!("job blew up");
      }
      Ok(0)
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(matches!(task.poll(), Some(Err(HttpError::Network(_)))));
    assert!(!task.is_running());
  }
}
