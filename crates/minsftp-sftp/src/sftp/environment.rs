// ── Process-wide transport environment ───────────────────────────────────────
//
// The transport library (and on some platforms the socket layer) must be
// started once per process and stopped once, no matter how many clients
// come and go. Each client holds an `EnvironmentGuard`; the first guard
// starts the environment and dropping the last one stops it.

use log::{debug, error, info};
use std::sync::{Arc, Mutex};

type StartHook = Box<dyn Fn() -> Result<(), String> + Send + Sync>;
type StopHook = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Default)]
struct Registry {
    holders: usize,
    started: bool,
    /// A failed start is terminal for the process.
    failure: Option<String>,
}

pub struct Environment {
    name: &'static str,
    state: Mutex<Registry>,
    start: StartHook,
    stop: StopHook,
}

impl Environment {
    pub fn new(
        name: &'static str,
        start: impl Fn() -> Result<(), String> + Send + Sync + 'static,
        stop: impl Fn() + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Environment {
            name,
            state: Mutex::new(Registry::default()),
            start: Box::new(start),
            stop: Box::new(stop),
        })
    }

    /// Take a hold on the environment, starting it if nobody holds it yet.
    pub fn acquire(self: &Arc<Self>) -> Result<EnvironmentGuard, String> {
        let mut reg = self.state.lock().unwrap_or_else(|p| p.into_inner());

        if let Some(ref why) = reg.failure {
            return Err(format!("{} environment unavailable: {}", self.name, why));
        }

        if !reg.started {
            if let Err(why) = (self.start)() {
                error!("{} environment failed to start: {}", self.name, why);
                reg.failure = Some(why.clone());
                return Err(why);
            }
            reg.started = true;
            info!("{} environment started", self.name);
        }

        reg.holders += 1;
        debug!("{} environment holders: {}", self.name, reg.holders);
        Ok(EnvironmentGuard {
            env: Arc::clone(self),
        })
    }

    pub fn holders(&self) -> usize {
        self.state.lock().map(|r| r.holders).unwrap_or(0)
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().map(|r| r.started).unwrap_or(false)
    }

    fn release(&self) {
        let mut reg = self.state.lock().unwrap_or_else(|p| p.into_inner());
        reg.holders = reg.holders.saturating_sub(1);
        if reg.holders == 0 && reg.started {
            (self.stop)();
            reg.started = false;
            info!("{} environment stopped", self.name);
        }
    }
}

/// One client's hold on the environment. Released exactly once, on drop.
pub struct EnvironmentGuard {
    env: Arc<Environment>,
}

impl Drop for EnvironmentGuard {
    fn drop(&mut self) {
        self.env.release();
    }
}
