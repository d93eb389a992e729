use colored::Colorize;
use dctpack::compression::quantizer::validate_quality;
use dctpack::compression::CompressionEngine;
use dctpack::{CompressedImage, CompressionConfig, Converter, PackError, PackResult, Raster};
use std::time::Instant;
use sysinfo::{Pid, System};

const DEFAULT_QUALITY: u8 = 70;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        print_usage();
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &[String]) -> PackResult<()> {
    let command = &args[1];
    let input = &args[2];

    match command.as_str() {
        "compress" | "encode" => {
            let Some(output) = args.get(3) else {
                eprintln!("{} Output file required", "Error:".red().bold());
                std::process::exit(1);
            };
            compress_image(input, output, parse_quality(args.get(4))?)
        }
        "decompress" | "decode" => {
            let Some(output) = args.get(3) else {
                eprintln!("{} Output file required", "Error:".red().bold());
                std::process::exit(1);
            };
            decompress_image(input, output)
        }
        "roundtrip" => roundtrip(input, parse_quality(args.get(3))?),
        "info" => show_info(input),
        _ => {
            eprintln!("{} Unknown command: {}", "Error:".red().bold(), command);
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Missing means the default; anything present must be a valid quality.
fn parse_quality(arg: Option<&String>) -> PackResult<u8> {
    let Some(raw) = arg else {
        return Ok(DEFAULT_QUALITY);
    };
    let quality = raw.parse::<u8>().map_err(|_| {
        PackError::InvalidArgument(format!("quality must be an integer in [1,99], got {:?}", raw))
    })?;
    validate_quality(quality)
}

fn compress_image(input: &str, output: &str, quality: u8) -> PackResult<()> {
    println!(
        "{} {} → {} (quality: {})",
        "Compressing".cyan().bold(),
        input.yellow(),
        output.green(),
        quality.to_string().magenta()
    );

    let record = Converter::new().with_quality(quality).compress_file(input, output)?;

    let input_size = std::fs::metadata(input)?.len();
    let output_size = std::fs::metadata(output)?.len();

    println!("{}", "✓ Compressed successfully!".green().bold());
    println!(
        "  {} {}x{}",
        "Size:  ".dimmed(),
        record.width.to_string().white(),
        record.height.to_string().white()
    );
    println!("  {} {} bytes", "Input: ".dimmed(), input_size.to_string().white());
    println!("  {} {} bytes", "Output:".dimmed(), output_size.to_string().white());
    println!(
        "  {} {:.2} MB of bits",
        "Stream:".dimmed(),
        record.bits_count as f64 / (8.0 * 1024.0 * 1024.0)
    );

    Ok(())
}

fn decompress_image(input: &str, output: &str) -> PackResult<()> {
    println!(
        "{} {} → {}",
        "Decompressing".cyan().bold(),
        input.yellow(),
        output.green()
    );

    let decoded = Converter::new().decompress_file(input, output)?;

    println!("{}", "✓ Decompressed successfully!".green().bold());
    println!(
        "  {} {}x{}",
        "Dimensions:".dimmed(),
        decoded.header.width.to_string().white(),
        decoded.header.height.to_string().white()
    );
    println!(
        "  {} {}",
        "Quality:   ".dimmed(),
        decoded.header.quality.to_string().magenta()
    );

    Ok(())
}

/// Highest process memory seen at the sampling points.
struct MemoryMeter {
    system: System,
    pid: Option<Pid>,
    peak_resident: u64,
    peak_virtual: u64,
}

impl MemoryMeter {
    fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
            peak_resident: 0,
            peak_virtual: 0,
        }
    }

    fn sample(&mut self) {
        let Some(pid) = self.pid else {
            return;
        };
        self.system.refresh_process(pid);
        if let Some(process) = self.system.process(pid) {
            self.peak_resident = self.peak_resident.max(process.memory());
            self.peak_virtual = self.peak_virtual.max(process.virtual_memory());
        }
    }
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

struct Stopwatch {
    start: Instant,
    memory: MemoryMeter,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            start: Instant::now(),
            memory: MemoryMeter::new(),
        }
    }

    fn report_and_restart(&mut self, text: &str) {
        println!(
            "  {} {}",
            format!("{:>10.3?}", self.start.elapsed()).cyan(),
            text
        );
        self.memory.sample();
        self.start = Instant::now();
    }
}

/// Compress, persist, reload and decompress one image, timing each step.
fn roundtrip(input: &str, quality: u8) -> PackResult<()> {
    let compressed_path = format!("{}.compressed.{}", input, quality);
    let uncompressed_path = format!("{}.uncompressed.{}.bmp", input, quality);

    println!(
        "{} {} (quality: {})",
        "Round trip".cyan().bold(),
        input.yellow(),
        quality.to_string().magenta()
    );

    let mut sw = Stopwatch::start();
    let engine = CompressionEngine::new(CompressionConfig::with_quality(quality))?;

    let img = image::open(input)?.to_rgb8();
    let file_size = std::fs::metadata(input)?.len();
    sw.report_and_restart(&format!(
        "{}x{} - {:.2} MB loaded",
        img.width(),
        img.height(),
        file_size as f64 / (1024.0 * 1024.0)
    ));

    let raster = Raster::from_rgb_image(&img);
    sw.report_and_restart("Converting to raster");

    let record = engine.compress(&raster)?;
    sw.report_and_restart(&format!(
        "Compression: {:.2} MB",
        record.bits_count as f64 / (8.0 * 1024.0 * 1024.0)
    ));

    record.save(&compressed_path)?;
    sw.report_and_restart("Saving compressed file");

    let loaded = CompressedImage::load(&compressed_path)?;
    sw.report_and_restart("Loading compressed file");

    let restored = engine.decompress(&loaded)?;
    sw.report_and_restart("Decompression");

    let out = restored.to_rgb_image();
    sw.report_and_restart("Converting to bitmap");

    out.save(&uncompressed_path)?;
    sw.report_and_restart("Saving decompressed image");

    println!(
        "  {} {:.2} MB",
        "Peak resident set:".dimmed(),
        megabytes(sw.memory.peak_resident)
    );
    println!(
        "  {} {:.2} MB",
        "Peak virtual size:".dimmed(),
        megabytes(sw.memory.peak_virtual)
    );
    println!("{}", "✓ Round trip complete".green().bold());
    println!("  {} {}", "Compressed:  ".dimmed(), compressed_path.white());
    println!("  {} {}", "Decompressed:".dimmed(), uncompressed_path.white());

    Ok(())
}

fn show_info(input: &str) -> PackResult<()> {
    let record = CompressedImage::load(input)?;
    let file_size = std::fs::metadata(input)?.len();

    println!();
    println!("{}", "═══ dctpack Record ═══".cyan().bold());
    println!("{} {}", "Version:".dimmed(), dctpack::VERSION.green());
    println!(
        "{} {}x{}",
        "Dimensions:".dimmed(),
        record.width.to_string().white(),
        record.height.to_string().white()
    );
    println!("{} {}", "Quality:".dimmed(), record.quality.to_string().magenta());
    println!("{} {}", "Bits:".dimmed(), record.bits_count.to_string().white());
    println!(
        "{} {}",
        "Codes:".dimmed(),
        record.decode_table.len().to_string().white()
    );
    println!("{} {} bytes", "File size:".dimmed(), file_size.to_string().white());
    println!(
        "{} {:.2}x",
        "Ratio:".dimmed(),
        record.compression_ratio()
    );
    println!();

    Ok(())
}

fn print_usage() {
    println!("{}", "dctpack - DCT block image codec".cyan().bold());
    println!();
    println!("{}", "Usage:".yellow().bold());
    println!("  dctpack compress <input> <output.dctp> [quality]");
    println!("  dctpack decompress <input.dctp> <output.bmp>");
    println!("  dctpack roundtrip <input> [quality]");
    println!("  dctpack info <file.dctp>");
    println!();
    println!(
        "{} quality must be in [1,99], default {}",
        "Note:".dimmed(),
        DEFAULT_QUALITY
    );
}
