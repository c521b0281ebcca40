//! Stronghold resource converter CLI.
//!
//! A command-line tool for testing, extracting and rebuilding the binary
//! image resources of the Stronghold games.
//!
//! # Commands
//!
//! - **test**: Parse a `.tgx` or `.gm1` file, verify its internal
//!   consistency and report structural statistics
//! - **extract**: Decode a resource file into a directory holding raw
//!   16-bit pixel canvases plus a meta sidecar
//! - **pack**: Re-encode such a directory back into a resource file
//!
//! # Usage
//!
//! ```bash
//! # Validate an archive
//! shc-rs test gm/tile_castle.gm1
//!
//! # Validate and dump the token trace of every TGX stream
//! shc-rs test gfx/frontend_main.tgx --test-tgx-to-text true
//!
//! # Extract into a directory and pack it back
//! shc-rs extract gm/anim_archer.gm1 work/anim_archer
//! shc-rs pack work/anim_archer gm/anim_archer.gm1
//!
//! # Unusual coder tuning
//! shc-rs pack work/anim_archer out.gm1 --tgx-coder-pixel-repeat-threshold 5
//! ```
//!
//! All commands exit with code 0 on success and 1 on any error.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use shc_rs::prelude::*;

#[derive(Parser)]
#[command(name = "shc-rs")]
#[command(version)]
#[command(about = "Test, extract and pack Stronghold TGX and GM1 resource files", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,

	/// Log level
	#[arg(
		long = "log",
		value_name = "LEVEL",
		value_enum,
		default_value = "INFO",
		global = true
	)]
	log: LogLevel,

	/// Also emit a human-readable token trace for tested TGX streams
	#[arg(
		long = "test-tgx-to-text",
		value_name = "BOOL",
		default_value_t = false,
		action = ArgAction::Set,
		global = true
	)]
	test_tgx_to_text: bool,

	/// Marker color used by the game for in-stream transparency
	#[arg(
		long = "tgx-coder-transparent-pixel-tgx-color",
		value_name = "COLOR",
		value_parser = parse_pixel,
		default_value = "0xf81f",
		global = true
	)]
	transparent_tgx_color: u16,

	/// Canvas value that represents transparency in raw pixel data
	#[arg(
		long = "tgx-coder-transparent-pixel-raw-color",
		value_name = "COLOR",
		value_parser = parse_pixel,
		default_value = "0x0000",
		global = true
	)]
	transparent_raw_color: u16,

	/// Minimum run length encoded as a repeating-pixels token
	#[arg(
		long = "tgx-coder-pixel-repeat-threshold",
		value_name = "COUNT",
		default_value_t = 3,
		global = true
	)]
	pixel_repeat_threshold: usize,

	/// Encoded stream length is padded to a multiple of this
	#[arg(
		long = "tgx-coder-padding-alignment",
		value_name = "BYTES",
		default_value_t = 4,
		global = true
	)]
	padding_alignment: usize,
}

#[derive(Subcommand)]
enum Command {
	/// Parse and validate a resource file
	Test {
		/// Path to the `.tgx` or `.gm1` file
		path: PathBuf,
	},

	/// Decode a resource file into a raw directory
	Extract {
		/// Path to the `.tgx` or `.gm1` file
		source: PathBuf,
		/// Target directory, created if missing
		target: PathBuf,
	},

	/// Re-encode a raw directory into a resource file
	Pack {
		/// Directory holding the meta sidecar and raw data files
		source: PathBuf,
		/// Target resource file
		target: PathBuf,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
	Trace,
	Debug,
	Info,
	Warning,
	Error,
}

impl LogLevel {
	fn as_filter(self) -> &'static str {
		match self {
			Self::Trace => "trace",
			Self::Debug => "debug",
			Self::Info => "info",
			Self::Warning => "warn",
			Self::Error => "error",
		}
	}
}

fn parse_pixel(value: &str) -> Result<u16, String> {
	let parsed = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		u16::from_str_radix(hex, 16)
	} else {
		value.parse()
	};
	parsed.map_err(|_| format!("'{value}' is not a 16-bit pixel value"))
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	// RUST_LOG still wins over --log when set
	env_logger::init_from_env(env_logger::Env::default().default_filter_or(cli.log.as_filter()));

	let config = CoderConfig {
		transparent_tgx_color: cli.transparent_tgx_color,
		transparent_raw_color: cli.transparent_raw_color,
		pixel_repeat_threshold: cli.pixel_repeat_threshold,
		padding_alignment: cli.padding_alignment,
	};

	match &cli.command {
		Command::Test { path } => run_test(path, &config, cli.test_tgx_to_text),
		Command::Extract { source, target } => run_extract(source, target, &config),
		Command::Pack { source, target } => run_pack(source, target, &config),
	}
}

fn extension_of(path: &Path) -> Option<String> {
	path.extension().map(|extension| extension.to_string_lossy().to_lowercase())
}

fn run_test(path: &Path, config: &CoderConfig, tgx_to_text: bool) -> anyhow::Result<()> {
	match extension_of(path).as_deref() {
		Some(file::tgx::FILE_EXTENSION) => test_tgx(path, config, tgx_to_text),
		Some(file::gm1::FILE_EXTENSION) => test_gm1(path, config, tgx_to_text),
		_ => bail!("'{}' has no known resource file extension", path.display()),
	}
}

fn test_tgx(path: &Path, config: &CoderConfig, tgx_to_text: bool) -> anyhow::Result<()> {
	let resource =
		TgxFile::open(path).with_context(|| format!("failed to load '{}'", path.display()))?;

	println!("### General TGX Info ###");
	println!("{resource}");
	println!();
	println!("# Coder Instruction #");
	println!("{config}");
	println!();

	let analysis = resource.validate(config).context("TGX is invalid")?;
	println!("# Structure Meta Data #");
	println!("{analysis}");
	println!();

	if tgx_to_text {
		log::info!("Printing TGX as text to stdout.");
		let text = file::tgx::coder::decode_to_text(resource.data(), ColorMode::Direct)
			.context("failed to print TGX as text")?;
		print!("{text}");
		println!();
	}

	println!("### TGX seems valid ###");
	Ok(())
}

fn test_gm1(path: &Path, config: &CoderConfig, tgx_to_text: bool) -> anyhow::Result<()> {
	let resource =
		Gm1File::open(path).with_context(|| format!("failed to load '{}'", path.display()))?;
	let header = resource.header();

	println!("### General GM1 Info ###");
	println!("Type: {}", header.gm1_type);
	println!("Number of pictures: {}", header.picture_count);
	println!("Image data size: {}", header.data_size);
	println!();
	println!("### GM1 Header ###");
	println!("{header}");
	println!();

	let validations = resource.validate(config).context("GM1 seems invalid")?;
	for validation in &validations {
		let index = validation.index;
		let entry = &resource.images()[index];

		println!("### Image {index} ###");
		println!("{}", entry.header);
		println!();
		match header.gm1_type {
			Gm1Type::TilesObject => println!("{}", Gm1TileObjectInfo::from_entry(entry, index)?),
			_ => println!("{}", Gm1GeneralInfo::from_entry(entry)),
		}
		println!();

		if let Some(analysis) = &validation.analysis {
			println!("# Structure Meta Data #");
			println!("{analysis}");
			println!();
		}

		if tgx_to_text
			&& let Some((stream, mode)) = resource.image_tgx_stream(index)?
		{
			log::info!("Printing TGX as text to stdout.");
			let text = file::tgx::coder::decode_to_text(stream, mode)
				.context("failed to print TGX as text")?;
			print!("{text}");
			println!();
		}
	}

	println!("### GM1 seems valid ###");
	Ok(())
}

fn run_extract(source: &Path, target: &Path, config: &CoderConfig) -> anyhow::Result<()> {
	match extension_of(source).as_deref() {
		Some(file::tgx::FILE_EXTENSION) => {
			let resource = TgxFile::open(source)
				.with_context(|| format!("failed to load '{}'", source.display()))?;
			resource
				.save_as_raw(target, config)
				.with_context(|| format!("failed to extract into '{}'", target.display()))?;
		}
		Some(file::gm1::FILE_EXTENSION) => {
			let resource = Gm1File::open(source)
				.with_context(|| format!("failed to load '{}'", source.display()))?;
			resource
				.save_as_raw(target, config)
				.with_context(|| format!("failed to extract into '{}'", target.display()))?;
		}
		_ => bail!("'{}' has no known resource file extension", source.display()),
	}
	Ok(())
}

fn run_pack(source: &Path, target: &Path, config: &CoderConfig) -> anyhow::Result<()> {
	let meta = MetaFile::open(source.join(file::META_FILE_NAME))
		.with_context(|| format!("failed to read the sidecar of '{}'", source.display()))?;
	let resource_type = meta.header().map_str(file::RESOURCE_TYPE_KEY)?.to_string();

	match resource_type.as_str() {
		file::RESOURCE_TYPE_TGX => {
			let resource = TgxFile::load_from_raw(source, config)
				.with_context(|| format!("failed to pack '{}'", source.display()))?;
			resource
				.save(target)
				.with_context(|| format!("failed to save '{}'", target.display()))?;
		}
		file::RESOURCE_TYPE_GM1 => {
			let resource = Gm1File::load_from_raw(source, config)
				.with_context(|| format!("failed to pack '{}'", source.display()))?;
			resource
				.save(target)
				.with_context(|| format!("failed to save '{}'", target.display()))?;
		}
		other => bail!("sidecar describes unknown resource type '{other}'"),
	}
	Ok(())
}
