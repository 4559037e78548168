use serde_json::json;

pub struct CliLogger {
    json: bool,
    no_color: bool,
}

impl CliLogger {
    pub fn new(json: bool, no_color: bool) -> Self {
        Self { json, no_color }
    }

    /// Reports go to stdout untouched so they can be piped or redirected.
    pub fn print_report(&self, report: &str) {
        println!("{}", report.trim_end());
    }

    pub fn print_error(&self, code: &str, msg: &str) {
        if self.json {
            let out = json!({
                "status": "error",
                "code": code,
                "message": msg,
            });
            println!("{out}");
            return;
        }
        eprintln!("{} {msg} {}", self.style("error", "31;1"), self.style(&format!("[{code}]"), "90"));
    }

    pub fn print_warning(&self, msg: &str) {
        if self.json {
            let out = json!({
                "status": "warning",
                "code": "warning",
                "message": msg,
            });
            eprintln!("{out}");
            return;
        }
        eprintln!("{} {msg}", self.style("warn", "33;1"));
    }

    fn style(&self, text: &str, ansi: &str) -> String {
        if self.no_color {
            return text.to_string();
        }
        format!("\x1b[{ansi}m{text}\x1b[0m")
    }
}
