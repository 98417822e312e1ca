use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Ipc(#[from] bench_ipc::IpcError),
    #[error(transparent)]
    Plugin(#[from] bench_plugin::PluginError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
