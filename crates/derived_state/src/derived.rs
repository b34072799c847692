use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use domain_access::AccessError;
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::RwLock;
use tracing::debug;

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, AccessError>> + Send + Sync>;

/// Phase of a derived value, as a UI would branch on it.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

/// The three pieces of state a hook exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T: Clone> Snapshot<T> {
    pub fn state(&self) -> LoadState<T> {
        if self.loading {
            return LoadState::Loading;
        }
        match (&self.error, &self.data) {
            (Some(message), _) => LoadState::Error(message.clone()),
            (None, Some(data)) => LoadState::Success(data.clone()),
            (None, None) => LoadState::Idle,
        }
    }
}

struct Inner<T> {
    data: Option<T>,
    error: Option<String>,
    mounted: bool,
}

/// Counts one running fetch; released when the refresh settles or is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Last result of a fetch, with loading and error flags.
///
/// `mount` runs the fetch once; `refresh` runs it again. Fetches are never
/// cancelled: when several are in flight, whichever resolves last overwrites
/// the state, and `loading` stays set until all of them have settled. A
/// failed fetch keeps the previous data and records the message.
pub struct Derived<T> {
    fetcher: Fetcher<T>,
    inner: RwLock<Inner<T>>,
    in_flight: AtomicUsize,
}

impl<T> Derived<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, AccessError>> + Send + 'static,
    {
        Self {
            fetcher: Arc::new(move || fetch().boxed()),
            inner: RwLock::new(Inner {
                data: None,
                error: None,
                mounted: false,
            }),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Runs the first fetch. Returns `false` if already mounted.
    pub async fn mount(&self) -> bool {
        {
            let mut inner = self.inner.write().await;
            if inner.mounted {
                return false;
            }
            inner.mounted = true;
        }
        self.refresh().await;
        true
    }

    /// Dropping the returned future abandons the fetch without touching the
    /// data; `loading` is released either way.
    pub async fn refresh(&self) {
        let _in_flight = InFlight::enter(&self.in_flight);
        self.inner.write().await.error = None;

        let result = (self.fetcher)().await;

        let mut inner = self.inner.write().await;
        match result {
            Ok(data) => {
                inner.data = Some(data);
                inner.error = None;
            }
            Err(err) => {
                debug!("Derived fetch failed: {}", err);
                inner.error = Some(err.to_string());
            }
        }
    }

    pub async fn snapshot(&self) -> Snapshot<T> {
        let inner = self.inner.read().await;
        Snapshot {
            data: inner.data.clone(),
            loading: self.in_flight.load(Ordering::SeqCst) > 0,
            error: inner.error.clone(),
        }
    }

    pub async fn state(&self) -> LoadState<T> {
        self.snapshot().await.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_mount_fetches_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let derived = Derived::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, AccessError>(n) }
        });

        assert_eq!(derived.state().await, LoadState::Idle);
        assert!(derived.mount().await);
        assert!(!derived.mount().await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(derived.state().await, LoadState::Success(1));

        derived.refresh().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(derived.snapshot().await.data, Some(2));
    }

    #[tokio::test]
    async fn test_refresh_clears_previous_error_and_keeps_data() {
        let fail = Arc::new(Mutex::new(false));
        let flag = fail.clone();
        let derived = Derived::new(move || {
            let failing = *flag.lock().unwrap();
            async move {
                if failing {
                    Err(AccessError::Unauthenticated)
                } else {
                    Ok("vert".to_string())
                }
            }
        });

        derived.mount().await;
        *fail.lock().unwrap() = true;
        derived.refresh().await;

        let snapshot = derived.snapshot().await;
        assert_eq!(snapshot.data.as_deref(), Some("vert"));
        assert_eq!(snapshot.error.as_deref(), Some("Utilisateur non authentifié"));
        assert!(!snapshot.loading);
        assert_eq!(
            snapshot.state(),
            LoadState::Error("Utilisateur non authentifié".to_string())
        );

        *fail.lock().unwrap() = false;
        derived.refresh().await;
        assert_eq!(derived.snapshot().await.error, None);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_last_resolved_wins() {
        let (first_tx, first_rx) = oneshot::channel::<&'static str>();
        let (second_tx, second_rx) = oneshot::channel::<&'static str>();
        let pending = Arc::new(Mutex::new(VecDeque::from([first_rx, second_rx])));

        let derived = Derived::new(move || {
            let rx = pending.lock().unwrap().pop_front();
            async move {
                match rx {
                    Some(rx) => Ok(rx.await.unwrap_or("closed").to_string()),
                    None => Err(AccessError::InvalidResponse("no pending fetch".to_string())),
                }
            }
        });

        let driver = async {
            second_tx.send("second").unwrap();
            while derived.snapshot().await.data.is_none() {
                tokio::task::yield_now().await;
            }
            let midway = derived.snapshot().await;
            assert_eq!(midway.data.as_deref(), Some("second"));
            assert!(midway.loading);

            first_tx.send("first").unwrap();
        };

        tokio::join!(derived.refresh(), derived.refresh(), driver);

        let settled = derived.snapshot().await;
        assert_eq!(settled.data.as_deref(), Some("first"));
        assert!(!settled.loading);
        assert_eq!(settled.state(), LoadState::Success("first".to_string()));
    }

    #[tokio::test]
    async fn test_dropped_refresh_releases_loading() {
        let derived = Derived::new(futures::future::pending::<Result<u32, AccessError>>);

        let mut refresh = Box::pin(derived.refresh());
        assert!(refresh.as_mut().now_or_never().is_none());
        assert!(derived.snapshot().await.loading);

        drop(refresh);
        let snapshot = derived.snapshot().await;
        assert!(!snapshot.loading);
        assert_eq!(snapshot.state(), LoadState::Idle);
    }
}
