// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown coordination.
//!
//! Both portal servers watch the same coordinator. An OS signal (SIGTERM,
//! SIGINT, SIGQUIT on Unix; Ctrl+C elsewhere) or a failing portal task
//! initiates shutdown, and every server drains and stops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tracing::{error, info, warn};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Coordinates graceful shutdown across the portal servers.
///
/// # Example
///
/// ```ignore
/// use remit_bin::shutdown::ShutdownCoordinator;
///
/// let coordinator = ShutdownCoordinator::new();
/// let signal = coordinator.shutdown_signal();
///
/// tokio::spawn(async move {
///     signal.wait().await;
///     println!("Shutdown received!");
/// });
///
/// coordinator.wait_for_shutdown().await;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: broadcast::Sender<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a handle that resolves once shutdown is initiated.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
            shutdown_initiated: self.shutdown_initiated.clone(),
        }
    }

    /// Initiates shutdown. Idempotent.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            let _ = self.sender.send(());
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Waits for an OS signal or a manual initiation, then initiates
    /// shutdown.
    pub async fn wait_for_shutdown(&self) {
        let manual = self.shutdown_signal();

        tokio::select! {
            _ = os_signal() => {}
            _ = manual.wait() => {}
        }

        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on the first termination signal.
///
/// If a handler cannot be registered, the failure is logged and that signal
/// is ignored.
#[cfg(unix)]
async fn os_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    async fn recv(kind: SignalKind, name: &'static str) {
        match signal(kind) {
            Ok(mut stream) => {
                stream.recv().await;
                info!(signal = name, "Received termination signal");
            }
            Err(e) => {
                warn!(signal = name, error = %e, "Failed to register signal handler");
                std::future::pending::<()>().await;
            }
        }
    }

    tokio::select! {
        _ = recv(SignalKind::terminate(), "SIGTERM") => {}
        _ = recv(SignalKind::interrupt(), "SIGINT") => {}
        _ = recv(SignalKind::quit(), "SIGQUIT") => {}
    }
}

#[cfg(not(unix))]
async fn os_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => {
            error!(error = %e, "Failed to register Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// ShutdownSignal
// =============================================================================

/// A handle that resolves when shutdown is initiated.
///
/// Pass `signal.wait()` to APIs that expect a shutdown future, such as
/// axum's `with_graceful_shutdown`.
pub struct ShutdownSignal {
    receiver: broadcast::Receiver<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Waits for the shutdown signal.
    pub async fn wait(mut self) {
        if self.shutdown_initiated.load(Ordering::SeqCst) {
            return;
        }
        // A closed or lagged channel also means the coordinator is gone or
        // already fired.
        let _ = self.receiver.recv().await;
    }
}

// =============================================================================
// ShutdownGuard
// =============================================================================

/// Initiates shutdown when dropped unless disarmed.
///
/// Each portal task holds one so that a server that exits on its own takes
/// the other portal down with it.
pub struct ShutdownGuard {
    coordinator: ShutdownCoordinator,
    name: &'static str,
    trigger_on_drop: bool,
}

impl ShutdownGuard {
    /// Creates a new shutdown guard labelled `name`.
    pub fn new(coordinator: ShutdownCoordinator, name: &'static str) -> Self {
        Self {
            coordinator,
            name,
            trigger_on_drop: true,
        }
    }

    /// Disarms the guard so it won't trigger shutdown on drop.
    pub fn disarm(mut self) {
        self.trigger_on_drop = false;
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        if self.trigger_on_drop && !self.coordinator.is_shutdown_initiated() {
            error!(task = self.name, "Task exited before shutdown, stopping");
            self.coordinator.initiate_shutdown();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
