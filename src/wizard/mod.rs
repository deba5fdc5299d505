//! Interactive configuration wizard.
//!
//! The wizard elicits a [`BuildConfig`] through a fixed sequence of
//! prompt-validate-loop steps. Each step re-prompts until its validation
//! passes, then advances; it never regresses to a prior step. Validation
//! itself lives in [`validate`] as pure functions, so the only thing this
//! module owns is the thin re-prompt driver over a [`Console`].

pub mod device;
pub mod validate;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use crate::catalog::DistroCatalog;
use crate::config::{BuildConfig, DesktopEnvironment, Distro, TargetDevice};
use crate::error::BuilderError;
use crate::executor::CommandExecutor;
use validate::DesktopChoice;

/// Line-oriented console boundary.
///
/// The production implementation reads stdin and hides secret input;
/// tests substitute a scripted implementation. Prompt formatting and
/// coloring are owned by the implementation, not the wizard.
pub trait Console {
    /// Prompts for one line of input.
    fn read_line(&self, prompt: &str) -> Result<String>;

    /// Prompts for secret input; the response is never echoed.
    fn read_secret(&self, prompt: &str) -> Result<String>;

    /// Shows a status line to the user.
    fn status(&self, message: &str);

    /// Shows a warning to the user (validation rejections).
    fn warn(&self, message: &str);
}

/// Production console reading stdin, hiding secrets via rpassword.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn read_line(&self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush().context("failed to flush stdout")?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn read_secret(&self, prompt: &str) -> Result<String> {
        rpassword::prompt_password(prompt).context("failed to read password")
    }

    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn warn(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// The configuration wizard.
///
/// Produces a fully populated, internally consistent [`BuildConfig`];
/// every validation failure is a user-correctable re-prompt loop.
pub struct Wizard<'a> {
    catalog: &'a DistroCatalog,
    console: &'a dyn Console,
    executor: &'a dyn CommandExecutor,
}

impl<'a> Wizard<'a> {
    pub fn new(
        catalog: &'a DistroCatalog,
        console: &'a dyn Console,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            catalog,
            console,
            executor,
        }
    }

    /// Runs all wizard steps in order and returns the final config.
    pub fn run(&self) -> Result<BuildConfig> {
        self.console.status("Welcome to Eupnea");
        self.console
            .status("This script will create a bootable Eupnea USB-drive/SD-card/image for you.");
        self.console.status(
            "You will now be asked a few questions. If you don't know what to answer, \
             just press 'enter' and the recommended answer will be used.",
        );
        self.console.read_line("(Press enter to continue)")?;

        let distro = self.ask_distro()?;
        let distro_version = self.ask_version(distro)?;
        let distro_link = self.catalog.link(distro, &distro_version);
        let desktop = self.ask_desktop(distro)?;

        // Gnome runs its own first-boot account setup; the wizard asks
        // for nothing it would immediately overwrite.
        let (username, password, hostname) = if desktop == DesktopEnvironment::Gnome {
            (
                crate::config::DEFAULT_USERNAME.to_string(),
                String::new(),
                crate::config::DEFAULT_HOSTNAME.to_string(),
            )
        } else {
            let username = self.ask_username()?;
            let password = self.ask_password()?;
            let hostname = self.ask_hostname()?;
            (username, password, hostname)
        };

        let rebind_search = self.ask_rebind_search()?;
        let device = self.ask_device()?;

        self.console.status("User input complete");
        Ok(BuildConfig {
            distro,
            distro_version,
            distro_link,
            desktop,
            username,
            password,
            hostname,
            device,
            rebind_search,
        })
    }

    /// Re-prompt driver: loops on user-correctable rejections, propagates
    /// everything else.
    fn prompt_until<T>(
        &self,
        prompt: &str,
        mut parse: impl FnMut(&str) -> Result<T, BuilderError>,
    ) -> Result<T> {
        loop {
            let input = self.console.read_line(prompt)?;
            match parse(&input) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_user_correctable() => self.console.warn(&e.to_string()),
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn ask_distro(&self) -> Result<Distro> {
        self.console
            .status("Which Linux distro(flavor) would you like to use?");
        self.prompt_until(
            "Available options: Ubuntu(default, recommended), Debian, Arch, Fedora\n",
            validate::parse_distro,
        )
    }

    fn ask_version(&self, distro: Distro) -> Result<String> {
        if !distro.has_version_dialog() {
            // Debian is pinned to its single catalog release; arch is
            // rolling and has no version at all.
            return match distro {
                Distro::Debian => {
                    let version = self.catalog.latest(distro)?;
                    self.console.status(&format!("Debian {} selected", version));
                    Ok(version)
                }
                _ => Ok(String::new()),
            };
        }
        self.console
            .status(&format!("Use latest {} version?", distro));
        let version = self.prompt_until(
            "Press enter for yes, or type in the version number: ",
            |input| validate::resolve_version(self.catalog, distro, input),
        )?;
        self.console
            .status(&format!("{}: {} selected", distro, version));
        Ok(version)
    }

    fn ask_desktop(&self, distro: Distro) -> Result<DesktopEnvironment> {
        self.console
            .status("Which desktop environment(Desktop GUI) would you like to use?");
        let options = DesktopEnvironment::options_for(distro)
            .iter()
            .map(|de| de.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!("Available options: {}\n", options);
        loop {
            let input = self.console.read_line(&prompt)?;
            match validate::parse_desktop(&input, distro) {
                Ok(DesktopChoice::Selected(desktop)) => {
                    self.console.status(&format!("{} selected", desktop));
                    return Ok(desktop);
                }
                Ok(DesktopChoice::CliNeedsConfirmation) => {
                    // Accepting "cli" silently produces a system with no
                    // graphical session, so it needs a second confirmation.
                    self.console
                        .warn("Warning: No desktop environment will be installed!");
                    let confirm = self.console.read_line(
                        "Type 'yes' to continue or press Enter to choose a desktop environment\n",
                    )?;
                    if validate::parse_yes(&confirm) {
                        self.console.status("No desktop will be installed");
                        return Ok(DesktopEnvironment::Cli);
                    }
                }
                Err(e) if e.is_user_correctable() => self.console.warn(&e.to_string()),
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn ask_username(&self) -> Result<String> {
        self.console.status("Enter username to be used in Eupnea");
        let username =
            self.prompt_until("Username(default: 'localuser'): ", validate::validate_username)?;
        self.console
            .status(&format!("Using {} as username", username));
        Ok(username)
    }

    fn ask_password(&self) -> Result<String> {
        self.console.status("Please set a secure password");
        loop {
            let candidate = self.console.read_secret("Password: ")?;
            if let Err(e) = validate::validate_password_candidate(&candidate) {
                // Rejected before the repeat entry is even asked for; the
                // whole pair starts over.
                self.console.warn(&e.to_string());
                continue;
            }
            let repeat = self.console.read_secret("Repeat password: ")?;
            match validate::match_passwords(&candidate, &repeat) {
                Ok(password) => {
                    self.console.status("Password set");
                    return Ok(password);
                }
                Err(e) => self.console.warn(&e.to_string()),
            }
        }
    }

    fn ask_hostname(&self) -> Result<String> {
        self.console
            .status("Enter hostname for the chromebook.(Hostname is something like a device name)");
        let hostname = self.prompt_until(
            "Hostname(default: 'eupnea-chromebook'): ",
            validate::validate_hostname,
        )?;
        self.console
            .status(&format!("Using {} as hostname", hostname));
        Ok(hostname)
    }

    fn ask_rebind_search(&self) -> Result<bool> {
        self.console.status(
            "Would you like to rebind the Search/Super/Win key to Caps Lock?(NOT RECOMMENDED)",
        );
        let input = self
            .console
            .read_line("Type yes to rebind. Press enter to keep old binding: ")?;
        let rebind = validate::parse_yes(&input);
        if rebind {
            self.console.status("Search key will be a CAPS LOCK key");
        } else {
            self.console.status("Search key will be Super/Win key");
        }
        Ok(rebind)
    }

    fn ask_device(&self) -> Result<TargetDevice> {
        let devices = device::list_removable_devices(self.executor)?;
        if devices.is_empty() {
            self.console
                .status("No available USBs/SD-cards found. Building image file.");
            return Ok(TargetDevice::Image);
        }
        for dev in &devices {
            self.console.status(&dev.description);
        }
        let names: Vec<String> = devices.into_iter().map(|d| d.name).collect();
        let device = self.prompt_until(
            "Enter USB-drive/SD-card name(example: sdb) or \"image\" to build an image\n",
            |input| validate::parse_device(input, &names),
        )?;
        match &device {
            TargetDevice::Image => self.console.status("Building image instead of writing directly"),
            TargetDevice::Disk(name) => self
                .console
                .status(&format!("Writing directly to /dev/{}", name)),
        }
        Ok(device)
    }
}
