use std::path::PathBuf;

/// Talk to a device over the bridge protocol.
#[derive(clap::Parser)]
pub struct Options {
	/// Print more verbose messages. Can be used multiple times.
	#[clap(long, short)]
	#[clap(global = true)]
	#[clap(action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// The serial port to use.
	#[clap(long, short)]
	#[clap(global = true)]
	#[cfg_attr(target_os = "windows", clap(default_value = "COM1"))]
	#[cfg_attr(not(target_os = "windows"), clap(default_value = "/dev/ttyUSB0"))]
	pub serial_port: PathBuf,

	/// The baud rate for the serial port.
	#[clap(long, short)]
	#[clap(global = true)]
	#[clap(default_value = "57600")]
	pub baud_rate: u32,

	#[clap(subcommand)]
	pub command: Command,
}

#[derive(clap::Parser)]
pub enum Command {
	/// Ask the server to confirm which protocol version it implements.
	MatchVersion,

	/// Ask the server for its hardware and firmware version.
	DeviceInfo,

	/// Run both `match-version` and `device-info`, and reject a server that disagrees
	/// with this client's protocol version or reports an unsupported firmware version.
	Check,

	/// Run as a server: answer `match-version` and `device-info` requests until interrupted.
	Serve {
		/// Hardware version to report for `device-info`.
		#[clap(long)]
		#[clap(default_value = "1")]
		hardware_version: u32,

		/// Firmware version to report for `device-info`.
		#[clap(long)]
		#[clap(default_value = "1")]
		firmware_version: u32,
	},

	/// Write shell completions to standard output or a file.
	ShellCompletion {
		/// The shell for which to generate completions.
		#[clap(long)]
		shell: clap_complete::Shell,

		/// The file to write the generated completion file to.
		#[clap(long, short)]
		output: Option<PathBuf>,
	},
}
