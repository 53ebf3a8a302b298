use bridge_protocol::{Client, DeviceInfo, Server, ServerEvent, PROTOCOL_VERSION};
use std::path::Path;
use std::time::Duration;

mod logging;
mod options;

use options::{Command, Options};

fn main() {
	let options: Options = clap::Parser::parse();
	logging::init(env!("CARGO_CRATE_NAME"), options.verbose as i8);
	if let Err(()) = do_main(options) {
		std::process::exit(1);
	}
}

fn do_main(options: Options) -> Result<(), ()> {
	match &options.command {
		Command::MatchVersion => {
			let mut client = open_client(&options)?;
			let version = client
				.match_protocol_version()
				.map_err(|e| log::error!("Command failed: {}", e))?;
			log::info!("Server protocol version: {}", version);
		},
		Command::DeviceInfo => {
			let mut client = open_client(&options)?;
			let info = client.get_device_info().map_err(|e| log::error!("Command failed: {}", e))?;
			log_device_info(&info);
		},
		Command::Check => {
			let mut client = open_client(&options)?;
			let version = client
				.match_protocol_version()
				.map_err(|e| log::error!("Command failed: {}", e))?;
			let info = client.get_device_info().map_err(|e| log::error!("Command failed: {}", e))?;
			log_device_info(&info);

			if version != PROTOCOL_VERSION {
				log::error!("Protocol version mismatch: server reports {}, we implement {}", version, PROTOCOL_VERSION);
				return Err(());
			}
			if info.firmware_version != 1 {
				log::error!("Unsupported firmware version: {}", info.firmware_version);
				return Err(());
			}
			log::info!("Ok");
		},
		Command::Serve { hardware_version, firmware_version } => {
			run_server(&options, *hardware_version, *firmware_version)?;
		},
		Command::ShellCompletion { shell, output } => {
			write_shell_completion(*shell, output.as_deref())?;
		},
	}

	Ok(())
}

fn open_client(options: &Options) -> Result<Client<serial2::SerialPort>, ()> {
	let port = open_port(options)?;
	Client::connect(port).map_err(|e| log::error!("Failed to synchronize with server: {}", e))
}

fn open_port(options: &Options) -> Result<serial2::SerialPort, ()> {
	log::debug!("Using serial port {} with baud rate {}", options.serial_port.display(), options.baud_rate);
	serial2::SerialPort::open(&options.serial_port, options.baud_rate)
		.map_err(|e| log::error!("Failed to open serial port {}: {}", options.serial_port.display(), e))
}

fn run_server(options: &Options, hardware_version: u32, firmware_version: u32) -> Result<(), ()> {
	let port = open_port(options)?;
	let mut server = Server::connect(port).map_err(|e| log::error!("Failed to synchronize with client: {}", e))?;
	log::info!("Serving on {}", options.serial_port.display());

	loop {
		match server.poll(Duration::from_millis(100)) {
			Ok(ServerEvent::NoRequest) => continue,
			Ok(ServerEvent::UnknownRequestRecovered) => {
				log::warn!("Recovered from a corrupted or unrecognized request");
			},
			Ok(ServerEvent::Request(bridge_protocol::Request::MatchProtocolVersion { protocol_version })) => {
				log::debug!("Client reports protocol version {}", protocol_version);
				if let Err(e) = server.answer_match_protocol_version() {
					log::error!("Failed to send answer: {}", e);
				}
			},
			Ok(ServerEvent::Request(bridge_protocol::Request::GetDeviceInfo)) => {
				log::debug!("Client asked for device info");
				let info = DeviceInfo { hardware_version, firmware_version };
				if let Err(e) = server.answer_get_device_info(info) {
					log::error!("Failed to send answer: {}", e);
				}
			},
			Ok(ServerEvent::Request(request)) => {
				log::warn!("Rejecting unsupported request: {:?}", request);
				if let Err(e) = server.recover_unknown_request() {
					log::error!("Failed to recover from unsupported request: {}", e);
					return Err(());
				}
			},
			Err(e) => {
				log::error!("Command failed: {}", e);
				return Err(());
			},
		}
	}
}

fn log_device_info(info: &DeviceInfo) {
	log::info!("Hardware version: {}", info.hardware_version);
	log::info!("Firmware version: {}", info.firmware_version);
}

fn write_shell_completion(shell: clap_complete::Shell, path: Option<&Path>) -> Result<(), ()> {
	use std::io::Write;
	let mut buffer = Vec::with_capacity(4 * 1024);

	clap_complete::generate(shell, &mut <Options as clap::CommandFactory>::command(), env!("CARGO_BIN_NAME"), &mut buffer);
	if !buffer.ends_with(b"\n") {
		buffer.push(b'\n');
	}

	let path = path.unwrap_or_else(|| Path::new("-"));
	if path == Path::new("-") {
		log::debug!("Writing shell completion for {} to stdout", shell);
		let stdout = std::io::stdout();
		stdout
			.lock()
			.write_all(&buffer)
			.map_err(|e| log::error!("Failed to write to stdout: {}", e))?;
	} else {
		log::debug!("Writing shell completion for {} to {}", shell, path.display());
		let mut output = std::fs::File::create(path).map_err(|e| log::error!("Failed to create {}: {}", path.display(), e))?;
		output
			.write_all(&buffer)
			.map_err(|e| log::error!("Failed to write to {}: {}", path.display(), e))?;
	}

	Ok(())
}
