use cat_viewer::{ViewerConfig, launch};

fn main() -> anyhow::Result<()> {
    launch(ViewerConfig::orbit())
}
