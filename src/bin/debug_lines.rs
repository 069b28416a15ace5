use pdf_outline::artifacts::ArtifactFilter;
use pdf_outline::headings::HeadingDetector;
use pdf_outline::{load_document, OutlineConfig};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: debug_lines <pdf_or_txt_path> [max_page | min-max]");
        std::process::exit(1);
    }

    let range = args.get(2).map(|s| s.as_str()).unwrap_or("1-3");
    let (min_page, max_page) = if let Some((a, b)) = range.split_once('-') {
        (a.parse().unwrap_or(1), b.parse().unwrap_or(3))
    } else {
        (1, range.parse().unwrap_or(3))
    };

    let source = match load_document(&args[1]) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = OutlineConfig::default();
    let artifacts = ArtifactFilter::new(&config);
    let detector = HeadingDetector::new(&config, &source.lines);
    println!(
        "pages={} lines={} median_font={:?} metadata_title={:?}",
        source.page_count,
        source.lines.len(),
        detector.median_font_size(),
        source.metadata_title
    );

    for page in min_page..=max_page {
        let page_lines: Vec<_> = source.lines.iter().filter(|l| l.page == page).collect();
        println!("=== PAGE {} ({} lines) ===", page, page_lines.len());
        for line in &page_lines {
            let verdict = if artifacts.is_artifact(&line.text) {
                "artifact"
            } else if detector.detect(line) {
                "CANDIDATE"
            } else {
                "body"
            };
            println!(
                "  y={:7.1} fs={:>5} b={} {:9} text={:?}",
                line.y,
                line.font_size
                    .map(|s| format!("{:.1}", s))
                    .unwrap_or_else(|| "-".into()),
                if line.bold { 1 } else { 0 },
                verdict,
                line.text
            );
        }
        println!();
    }
}
