extern crate libipl;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

#[derive(Parser, Debug)]
#[command(name = "IPL CLI")]
#[command(about, author, version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scramble a ".dol" executable into a flashable payload array
    #[command(arg_required_else_help = true)]
    Encode {
        /// Input ".dol" executable
        file: String,
        /// Output C source file
        out: String,
    },
    /// Recover a ".dol" executable from a flashed UF2 container
    #[command(arg_required_else_help = true)]
    Decode {
        /// Input ".uf2" container
        file: String,
        /// Output ".dol" executable
        out: String,
    },
}

pub fn main() -> Result<()> {
    let stdout = console::Term::stdout();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { file, out } => command_encode(stdout, file, out)?,
        Commands::Decode { file, out } => command_decode(stdout, file, out)?,
    }

    Ok(())
}

fn command_encode(stdout: console::Term, file: String, out: String) -> Result<()> {
    let executable = std::fs::read(&file).into_diagnostic()?;
    let encoded = libipl::encode(&executable).into_diagnostic()?;

    let text = format!(
        "Entry point:   0x{:08X}\nLoad address:  0x{:08X}\nImage size:    {} bytes ({}K)\nOutput size:   {} bytes ({}K)",
        encoded.entry,
        encoded.base,
        encoded.image_size,
        encoded.image_size / 1024,
        encoded.padded_size,
        encoded.padded_size / 1024,
    );
    stdout.write_line(&text).into_diagnostic()?;

    let source = render_flash_array(&encoded, &file, &out);
    std::fs::write(out, source).into_diagnostic()?;

    Ok(())
}

fn command_decode(stdout: console::Term, file: String, out: String) -> Result<()> {
    let container = std::fs::read(&file).into_diagnostic()?;
    let decoded = libipl::decode(&container).into_diagnostic()?;

    let text = format!(
        "Block count:   {}\nExtracted:     {} bytes ({}K)\nEntry point:   0x{:08X}\nLoad address:  0x{:08X}\nImage size:    {} bytes ({}K)",
        decoded.block_count,
        decoded.extracted_size,
        decoded.extracted_size / 1024,
        libipl::pipeline::ENTRY_ADDRESS,
        libipl::pipeline::LOAD_ADDRESS,
        decoded.image_size,
        decoded.image_size / 1024,
    );
    stdout.write_line(&text).into_diagnostic()?;

    std::fs::write(out, decoded.dol).into_diagnostic()?;

    Ok(())
}

/// Serialize the scrambled payload as a C array of big-endian word
/// literals, four per line, ready for inclusion in the flasher firmware.
fn render_flash_array(encoded: &libipl::Encoded, input: &str, output: &str) -> String {
    let words: Vec<String> = encoded
        .scrambled
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            format!("0x{:08x}", u32::from_be_bytes(word))
        })
        .collect();

    let mut source = String::from("#include <stdio.h>\n\n");
    source.push_str("//\n");
    source.push_str(&format!("// Command: ipl-cli encode {} {}\n", input, output));
    source.push_str("//\n");
    source.push_str(&format!(
        "// File: {}, size: {} bytes\n",
        input, encoded.image_size
    ));
    source.push_str("//\n\n");
    source.push_str("uint32_t __in_flash(\"ipl_data\") ipl[]  = {\n\t");

    for (index, word) in words.iter().enumerate() {
        if index > 0 && index % 4 == 0 {
            source.push_str("\n\t");
        }
        source.push_str(word);
        if index != words.len() - 1 {
            source.push_str(", ");
        }
    }

    source.push_str("\n};\n");
    source
}
