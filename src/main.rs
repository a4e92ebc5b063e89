use motopv_leads::tui::Flow;
use std::path::PathBuf;

const USAGE: &str = "Usage: motopv-leads [--quote | --contact] [--config=<path>]
       motopv-leads --tui-smoke[=basic|property|system|review|thanks|contact]
       motopv-leads --submit-smoke[=N]
       motopv-leads --print-config";

fn flag_value(args: &[String], flag: &str) -> Option<Option<String>> {
    let prefix = format!("{}=", flag);
    args.iter().find_map(|a| {
        if a == flag {
            Some(None)
        } else {
            a.strip_prefix(prefix.as_str())
                .map(|v| Some(v.trim().to_string()).filter(|v| !v.is_empty()))
        }
    })
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return;
    }

    // Explicit settings file: --config=<path> or --config <path>
    let config: Option<PathBuf> = match flag_value(&args, "--config") {
        Some(Some(p)) => Some(PathBuf::from(p)),
        Some(None) => match args
            .iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1))
        {
            Some(p) => Some(PathBuf::from(p)),
            None => {
                eprintln!("--config needs a path\n{}", USAGE);
                std::process::exit(2);
            }
        },
        None => None,
    };
    let config = config.as_deref();

    if args.iter().any(|a| a == "--print-config") {
        motopv_leads::print_config(config);
        return;
    }

    // Renders a single frame for a specific page and exits 0.
    if let Some(target) = flag_value(&args, "--tui-smoke") {
        motopv_leads::run_tui_smoke(target, config);
        return;
    }

    // Runs N submissions against a zero-delay mock gateway and prints the observed success rate.
    if let Some(n) = flag_value(&args, "--submit-smoke") {
        let trials = match n.map(|v| v.parse::<usize>()) {
            None => None,
            Some(Ok(v)) => Some(v),
            Some(Err(_)) => {
                eprintln!("--submit-smoke expects a number\n{}", USAGE);
                std::process::exit(2);
            }
        };
        motopv_leads::run_submit_smoke(trials, config);
        return;
    }

    let flow = if args.iter().any(|a| a == "--contact") {
        Flow::Contact
    } else {
        Flow::Quote
    };
    motopv_leads::run_tui(flow, config);
}
