use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        print_entry("model", self.model.as_deref(), self.model());
        print_entry("base-url", self.base_url.as_deref(), self.base_url());
        print_entry(
            "conversation",
            self.conversation_key.as_deref(),
            self.conversation_key(),
        );
        match (&self.data_dir, self.data_dir()) {
            (Some(dir), _) => println!("  data-dir: {}", path_display(dir)),
            (None, Some(dir)) => println!("  data-dir: {} (default)", path_display(dir)),
            (None, None) => println!("  data-dir: (unset)"),
        }
        print_entry(
            "transcript-style",
            self.transcript_style.map(|style| style.as_str()),
            self.transcript_style().as_str(),
        );
    }
}

fn print_entry(key: &str, configured: Option<&str>, effective: &str) {
    match configured {
        Some(value) => println!("  {key}: {value}"),
        None => println!("  {key}: {effective} (default)"),
    }
}
