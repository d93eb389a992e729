use dctpack::compression::BLOCK_SIZE;
use dctpack::{CompressedImage, PackResult};

fn main() -> PackResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: dctdebug <file.dctp>");
        std::process::exit(1);
    }

    let path = &args[1];
    let file_size = std::fs::metadata(path)?.len();

    println!("<--- dctpack Record Debug --->\n");
    println!("File: {}", path);
    println!("Size: {} bytes", file_size);

    let record = CompressedImage::load(path)?;
    let header = record.header();

    println!("\n<--- Header --->");
    println!("Width: {}", header.width);
    println!("Height: {}", header.height);
    println!("Quality: {}", header.quality);
    println!("Bits: {}", header.bits_count);
    println!(
        "Blocks: {}x{}",
        header.width as usize / BLOCK_SIZE,
        header.height as usize / BLOCK_SIZE
    );

    let table = &record.decode_table;
    println!("\n<--- Decode Table --->");
    println!("Codes: {}", table.len());
    println!("Longest code: {} bits", table.max_code_len());
    for (len, count) in table.length_histogram().iter().enumerate() {
        if *count > 0 {
            println!("  {:>2} bits: {}", len, count);
        }
    }
    if let Some((code, symbol)) = table.iter().min_by_key(|(c, _)| c.len) {
        println!(
            "Shortest: {:#04x} ({}) -> {:0width$b}",
            symbol,
            *symbol as i8,
            code.bits,
            width = code.len as usize
        );
    }

    let padding = record.data.len() as u64 * 8 - header.bits_count;
    println!("\n<--- Bitstream --->");
    println!("Packed bytes: {}", record.data.len());
    println!("Padding bits: {}", padding);
    println!("Raw size: {} bytes", header.raw_size());
    println!("Ratio: {:.2}x", record.compression_ratio());

    println!("\n✓ Record parsed successfully");

    Ok(())
}
