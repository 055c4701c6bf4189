use static_huffman::HuffmanCodec;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join("static-huffman-demo");
    std::fs::create_dir_all(&dir)?;

    let sample_text = "Hello, world! This is a sample text for Huffman compression. \
                      The quick brown fox jumps over the lazy dog. \
                      Huffman encoding is a greedy algorithm that builds optimal prefix codes.";

    let input = dir.join("sample.txt");
    let encoded = dir.join("sample.enc");
    let freq = dir.join(".sample_freq.txt");
    let decoded = dir.join("decompressed.txt");

    std::fs::write(&input, sample_text)?;
    println!("Created sample file: {} bytes", sample_text.len());

    let summary = HuffmanCodec::encode_file(&input, &encoded, &freq)?;
    let freq_size = std::fs::metadata(&freq)?.len();
    println!(
        "Compressed to: {} bytes payload + {} bytes table ({:.1}% of original, {} symbols)",
        summary.encoded_bytes,
        freq_size,
        summary.encoded_bytes as f64 / sample_text.len() as f64 * 100.0,
        summary.distinct_symbols
    );

    HuffmanCodec::decode_file(&encoded, &decoded, &freq)?;

    let decompressed_text = std::fs::read_to_string(&decoded)?;
    if sample_text != decompressed_text {
        return Err("Decompression verification failed".into());
    }
    println!("Decompression successful! Data matches exactly.");

    cleanup(&dir)?;
    Ok(())
}

fn cleanup(dir: &Path) -> std::io::Result<()> {
    std::fs::remove_dir_all(dir)
}
