use std::path::Path;

pub fn run(data_dir: &Path, port: u16, open_browser: bool) -> anyhow::Result<()> {
    stride_core::io::ensure_dir(data_dir)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(stride_server::serve(data_dir, port, open_browser))
}
