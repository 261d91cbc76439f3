use async_trait::async_trait;
use parking_lot::Mutex;
use search_debugger_core_types::DebuggerStatus;
use search_view::model::HostCommand;
use search_view::ports::DebuggerHost;
use search_view::ViewResult;
use tracing::{error, info};

/// Host that records debugger status changes and reports errors on stderr.
pub struct LoggingHost {
    port: u16,
    status: Mutex<DebuggerStatus>,
    errors: Mutex<Vec<String>>,
}

impl LoggingHost {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            status: Mutex::new(DebuggerStatus::off()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn status(&self) -> DebuggerStatus {
        *self.status.lock()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

#[async_trait]
impl DebuggerHost for LoggingHost {
    async fn execute(&self, command: HostCommand) -> ViewResult<DebuggerStatus> {
        let mut status = self.status.lock();
        match command {
            HostCommand::Start => *status = DebuggerStatus::new(true, self.port),
            HostCommand::Stop => *status = DebuggerStatus::off(),
            HostCommand::Reset => {}
        }
        info!(command = command.as_str(), status = %*status, "debugger host command");
        Ok(*status)
    }

    async fn show_error(&self, message: &str) {
        error!(error = message, "search debugger error");
        eprintln!("error: {message}");
        self.errors.lock().push(message.to_string());
    }
}
