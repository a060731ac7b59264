//! REPL – the terminal front-end of the calibration dialog.
//!
//! Supported slash-commands:
//!   /help                              – show this list
//!   /list                              – list the calibration catalog
//!   /select N                          – select catalog row N
//!   /add [path]                        – add a calibration file
//!   /remove                            – remove the selected user file
//!   /sensor x y z yaw pitch roll       – lidar mounting pose
//!   /gps x y z yaw pitch roll          – GPS antenna pose
//!   /ports lidar gps [lidar_fwd gps_fwd]
//!   /forward on|off [ip]               – packet forwarding
//!   /advanced on|off                   – show / hide the advanced groups
//!   /clear                             – reset the advanced settings
//!   /show                              – print the pending configuration
//!   /accept [json]                     – save and exit
//!   /cancel | /quit                    – discard edits and exit

use colored::Colorize;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hdlacq_dialog::{AcquisitionConfig, CalibrationCatalog, CalibrationDialog, UiEffect, Widget};
use hdlacq_settings::SettingsStore;
use hdlacq_transform::Matrix4;
use hdlacq_types::Pose;

use crate::picker::StdinPicker;

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Help,
    List,
    Select(usize),
    Add(Option<String>),
    Remove,
    Sensor(Pose),
    Gps(Pose),
    Ports {
        lidar: i64,
        gps: i64,
        forwarding: Option<(i64, i64)>,
    },
    Forward {
        enabled: bool,
        ip: Option<String>,
    },
    Advanced(bool),
    Clear,
    Show,
    Accept { json: bool },
    Cancel,
}

/// Parse one input line.  `Err` carries the message shown to the operator.
pub(crate) fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = parts.collect();

    match head {
        "/help" => Ok(Command::Help),
        "/list" => Ok(Command::List),
        "/select" => match args.as_slice() {
            [n] => n
                .parse()
                .map(Command::Select)
                .map_err(|_| format!("'{}' is not a row number", n)),
            _ => Err("usage: /select N".to_string()),
        },
        "/add" => {
            // Paths may contain spaces ("Puck Hi-Res.xml").
            let rest = line.trim_start().trim_start_matches("/add").trim();
            Ok(Command::Add((!rest.is_empty()).then(|| rest.to_string())))
        }
        "/remove" => Ok(Command::Remove),
        "/sensor" => parse_pose(&args).map(Command::Sensor),
        "/gps" => parse_pose(&args).map(Command::Gps),
        "/ports" => {
            let nums = args
                .iter()
                .map(|a| a.parse::<i64>().map_err(|_| format!("'{}' is not a port number", a)))
                .collect::<Result<Vec<_>, _>>()?;
            match nums.as_slice() {
                [lidar, gps] => Ok(Command::Ports {
                    lidar: *lidar,
                    gps: *gps,
                    forwarding: None,
                }),
                [lidar, gps, lf, gf] => Ok(Command::Ports {
                    lidar: *lidar,
                    gps: *gps,
                    forwarding: Some((*lf, *gf)),
                }),
                _ => Err("usage: /ports lidar gps [lidar_fwd gps_fwd]".to_string()),
            }
        }
        "/forward" => match args.as_slice() {
            [flag] => Ok(Command::Forward {
                enabled: parse_on_off(flag)?,
                ip: None,
            }),
            [flag, ip] => Ok(Command::Forward {
                enabled: parse_on_off(flag)?,
                ip: Some(ip.to_string()),
            }),
            _ => Err("usage: /forward on|off [ip]".to_string()),
        },
        "/advanced" => match args.as_slice() {
            [flag] => parse_on_off(flag).map(Command::Advanced),
            _ => Err("usage: /advanced on|off".to_string()),
        },
        "/clear" => Ok(Command::Clear),
        "/show" => Ok(Command::Show),
        "/accept" => match args.as_slice() {
            [] => Ok(Command::Accept { json: false }),
            ["json"] => Ok(Command::Accept { json: true }),
            _ => Err("usage: /accept [json]".to_string()),
        },
        "/cancel" | "/quit" | "/exit" => Ok(Command::Cancel),
        other => Err(format!("Unknown command '{}'", other)),
    }
}

fn parse_pose(args: &[&str]) -> Result<Pose, String> {
    if args.len() != 6 {
        return Err("usage: x y z yaw pitch roll".to_string());
    }
    let mut v = [0.0_f64; 6];
    for (slot, raw) in v.iter_mut().zip(args) {
        *slot = raw
            .parse()
            .map_err(|_| format!("'{}' is not a number", raw))?;
    }
    Ok(Pose::new(v[0], v[1], v[2], v[3], v[4], v[5]))
}

fn parse_on_off(raw: &str) -> Result<bool, String> {
    match raw.to_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => Err(format!("expected on|off, got '{}'", other)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Terminal view
// ─────────────────────────────────────────────────────────────────────────────

/// Widget state of the terminal front-end, driven purely by [`UiEffect`]s.
#[derive(Debug, Default)]
pub(crate) struct TerminalView {
    hidden: HashSet<Widget>,
    disabled: HashSet<Widget>,
    selected_row: usize,
}

impl TerminalView {
    pub(crate) fn apply(&mut self, effects: &[UiEffect], catalog: &CalibrationCatalog) {
        for effect in effects {
            match effect {
                UiEffect::SetVisible(w, true) => {
                    self.hidden.remove(w);
                }
                UiEffect::SetVisible(w, false) => {
                    self.hidden.insert(*w);
                }
                UiEffect::SetEnabled(w, true) => {
                    self.disabled.remove(w);
                }
                UiEffect::SetEnabled(w, false) => {
                    self.disabled.insert(*w);
                }
                UiEffect::AppendRow(row) => {
                    if let Some(entry) = catalog.get(*row) {
                        println!("  {} [{}] {}", "+".green().bold(), row, entry.display_name().bold());
                    }
                }
                UiEffect::RemoveRow(row) => {
                    println!("  {} row {} removed", "-".red().bold(), row);
                }
                UiEffect::SelectRow(row) => self.selected_row = *row,
            }
        }
    }

    pub(crate) fn is_visible(&self, w: Widget) -> bool {
        !self.hidden.contains(&w)
    }

    pub(crate) fn is_enabled(&self, w: Widget) -> bool {
        !self.disabled.contains(&w)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loop
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point for the interactive REPL.
///
/// Returns the accepted configuration, or `None` when the dialog was
/// cancelled (including Ctrl-C via `shutdown` and end of input).
pub fn run<S: SettingsStore>(
    dialog: &mut CalibrationDialog<S>,
    shutdown: Arc<AtomicBool>,
) -> Option<AcquisitionConfig> {
    run_with_input(dialog, io::stdin().lock(), &shutdown)
}

pub(crate) fn run_with_input<S: SettingsStore, R: BufRead>(
    dialog: &mut CalibrationDialog<S>,
    mut input: R,
    shutdown: &AtomicBool,
) -> Option<AcquisitionConfig> {
    let mut stdout = io::stdout();
    let mut view = TerminalView::default();
    let initial = dialog.initial_effects();
    view.apply(&initial, dialog.catalog());

    loop {
        if shutdown.load(Ordering::SeqCst) {
            dialog.reject();
            return None;
        }

        print!("{} ", "hdlacq>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                dialog.reject();
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                dialog.reject();
                return None;
            }
        }

        // Ctrl-C while the prompt was waiting discards whatever was typed.
        if shutdown.load(Ordering::SeqCst) {
            dialog.reject();
            return None;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cmd = match parse_command(line) {
            Ok(cmd) => cmd,
            Err(msg) => {
                println!("{} {}. Type {} for available commands.", "Error:".red(), msg, "/help".bold());
                continue;
            }
        };

        match cmd {
            Command::Help => cmd_help(),
            Command::List => cmd_list(dialog, &view),
            Command::Select(row) => {
                let effects = dialog.on_row_changed(row);
                if effects.is_empty() {
                    println!("{} row {} is not in the catalog", "Error:".red(), row);
                } else {
                    view.apply(&effects, dialog.catalog());
                    view.selected_row = row;
                    println!("  Selected {}", describe_selection(dialog.catalog(), row).bold());
                }
            }
            Command::Add(path) => {
                let effects = match path {
                    Some(p) => dialog.on_file_chosen(&p),
                    None => dialog.add_file(&mut StdinPicker),
                };
                if effects.is_empty() {
                    println!("  {}", "No file added.".dimmed());
                }
                view.apply(&effects, dialog.catalog());
            }
            Command::Remove => {
                if !view.is_enabled(Widget::RemoveButton) {
                    println!("{} built-in entries cannot be removed", "Error:".red());
                    continue;
                }
                let effects = dialog.on_remove_clicked();
                view.apply(&effects, dialog.catalog());
            }
            Command::Sensor(pose) => {
                if require(&view, Widget::LidarPoseGroup) {
                    dialog.set_sensor_pose(pose);
                }
            }
            Command::Gps(pose) => {
                if require(&view, Widget::GpsPoseGroup) {
                    dialog.set_gps_pose(pose);
                }
            }
            Command::Ports { lidar, gps, forwarding } => {
                if !require(&view, Widget::NetworkGroup) {
                    continue;
                }
                if forwarding.is_some() && !require(&view, Widget::LidarForwardingPort) {
                    continue;
                }
                let net = dialog.network_mut();
                net.set_lidar_port(lidar);
                net.set_gps_port(gps);
                if let Some((lf, gf)) = forwarding {
                    net.set_lidar_forwarding_port(lf);
                    net.set_gps_forwarding_port(gf);
                }
                println!(
                    "  Ports: lidar {}  gps {}  (forwarding {} / {})",
                    net.lidar_port(),
                    net.gps_port(),
                    net.lidar_forwarding_port(),
                    net.gps_forwarding_port()
                );
            }
            Command::Forward { enabled, ip } => {
                if !require(&view, Widget::NetworkForwardingGroup) {
                    continue;
                }
                let effects = dialog.on_forwarding_toggled(enabled);
                view.apply(&effects, dialog.catalog());
                if let Some(ip) = ip
                    && require(&view, Widget::ForwardIpAddress)
                {
                    dialog.network_mut().forward_ip_address = ip;
                }
            }
            Command::Advanced(visible) => {
                let effects = dialog.on_advanced_toggled(visible);
                view.apply(&effects, dialog.catalog());
            }
            Command::Clear => {
                let effects = dialog.on_clear_advanced();
                view.apply(&effects, dialog.catalog());
                println!("  {}", "Advanced settings reset to defaults.".green());
            }
            Command::Show => print_config(&dialog.config()),
            Command::Accept { json } => {
                let cfg = dialog.accept();
                if json {
                    match serde_json::to_string_pretty(&cfg) {
                        Ok(s) => println!("{}", s),
                        Err(e) => println!("{}: {}", "Serialization error".red(), e),
                    }
                } else {
                    print_config(&cfg);
                }
                println!("{}", "✓ Configuration saved.".green());
                return Some(cfg);
            }
            Command::Cancel => {
                dialog.reject();
                println!("{}", "Edits discarded.".yellow());
                return None;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Calibration Commands".bold().underline());
    println!("  {}            – list calibration files", "/list".bold().cyan());
    println!("  {}        – select a catalog row", "/select N".bold().cyan());
    println!("  {}      – add a calibration file", "/add [path]".bold().cyan());
    println!("  {}          – remove the selected user file", "/remove".bold().cyan());
    println!("  {}        – show / hide advanced settings", "/advanced on|off".bold().cyan());
    println!("  {} – lidar mounting pose", "/sensor x y z yaw pitch roll".bold().cyan());
    println!("  {}    – GPS antenna pose", "/gps x y z yaw pitch roll".bold().cyan());
    println!("  {}", "/ports lidar gps [lidar_fwd gps_fwd]".bold().cyan());
    println!("  {}      – packet forwarding", "/forward on|off [ip]".bold().cyan());
    println!("  {}           – reset advanced settings", "/clear".bold().cyan());
    println!("  {}            – print the pending configuration", "/show".bold().cyan());
    println!("  {}   – save and exit", "/accept [json]".bold().cyan());
    println!("  {}  – discard edits and exit", "/cancel  /quit".bold().cyan());
    println!();
}

fn cmd_list<S: SettingsStore>(dialog: &CalibrationDialog<S>, view: &TerminalView) {
    println!("{}", "Calibration Files".bold().underline());
    for (row, entry) in dialog.catalog().entries().iter().enumerate() {
        let marker = if row == view.selected_row { "▶" } else { " " };
        let name = if entry.is_removable() {
            entry.display_name().normal()
        } else {
            entry.display_name().bold()
        };
        println!("  {} [{}] {}  {}", marker.green(), row, name, entry.tooltip().dimmed());
    }
}

/// Print a one-line error when `w` cannot be edited right now.
fn require(view: &TerminalView, w: Widget) -> bool {
    if !view.is_visible(w) {
        println!("{} enable {} first", "Error:".red(), "/advanced on".bold());
        return false;
    }
    if !view.is_enabled(w) {
        println!("{} enable {} first", "Error:".red(), "/forward on".bold());
        return false;
    }
    true
}

fn describe_selection(catalog: &CalibrationCatalog, row: usize) -> String {
    catalog
        .get(row)
        .map(|e| e.display_name())
        .unwrap_or_default()
}

fn print_config(cfg: &AcquisitionConfig) {
    let calibration = if cfg.uses_live_corrections() {
        "live corrections".to_string()
    } else {
        cfg.selected_calibration_file().to_string()
    };
    println!("{}", "Acquisition Configuration".bold().underline());
    println!("  Calibration : {}", calibration.yellow());
    print_pose("Sensor pose", cfg.sensor_pose());
    print_pose("GPS pose   ", cfg.gps_pose());
    println!("  Lidar port  : {}", cfg.lidar_port().to_string().yellow());
    println!("  GPS port    : {}", cfg.gps_port().to_string().yellow());
    if cfg.is_forwarding() {
        match cfg.forward_destinations() {
            Ok((lidar, gps)) => println!("  Forwarding  : lidar → {}  gps → {}", lidar, gps),
            Err(e) => println!("  Forwarding  : {}", e.to_string().red()),
        }
    } else {
        println!("  Forwarding  : {}", "off".dimmed());
    }
    println!("  Sensor transform:");
    for line in format_matrix(&cfg.sensor_transform()) {
        println!("    {}", line);
    }
    println!("  GPS transform:");
    for line in format_matrix(&cfg.gps_transform()) {
        println!("    {}", line);
    }
}

fn print_pose(label: &str, pose: &Pose) {
    println!(
        "  {} : origin ({}, {}, {})  yaw {}°  pitch {}°  roll {}°",
        label, pose.origin_x, pose.origin_y, pose.origin_z, pose.yaw, pose.pitch, pose.roll
    );
}

pub(crate) fn format_matrix(m: &Matrix4) -> Vec<String> {
    m.m.iter()
        .map(|row| {
            row.iter()
                .map(|v| format!("{:>10.4}", v + 0.0))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlacq_dialog::{DialogOutcome, keys};
    use hdlacq_settings::{MemorySettings, SettingsStore};

    #[test]
    fn parses_pose_commands() {
        assert_eq!(
            parse_command("/sensor 1 2 3 90 0 -5.5"),
            Ok(Command::Sensor(Pose::new(1.0, 2.0, 3.0, 90.0, 0.0, -5.5)))
        );
        assert!(parse_command("/gps 1 2 3").is_err());
        assert!(parse_command("/gps 1 2 3 a b c").is_err());
    }

    #[test]
    fn add_keeps_paths_with_spaces() {
        assert_eq!(
            parse_command("/add /data/Puck Hi-Res.xml"),
            Ok(Command::Add(Some("/data/Puck Hi-Res.xml".to_string())))
        );
        assert_eq!(parse_command("/add"), Ok(Command::Add(None)));
    }

    #[test]
    fn parses_ports_with_and_without_forwarding() {
        assert_eq!(
            parse_command("/ports 2400 8400"),
            Ok(Command::Ports { lidar: 2400, gps: 8400, forwarding: None })
        );
        assert_eq!(
            parse_command("/ports 2400 8400 2401 8401"),
            Ok(Command::Ports { lidar: 2400, gps: 8400, forwarding: Some((2401, 8401)) })
        );
        assert!(parse_command("/ports 2400").is_err());
    }

    #[test]
    fn parses_toggles() {
        assert_eq!(
            parse_command("/forward on 10.0.0.2"),
            Ok(Command::Forward { enabled: true, ip: Some("10.0.0.2".into()) })
        );
        assert_eq!(parse_command("/advanced OFF"), Ok(Command::Advanced(false)));
        assert!(parse_command("/advanced maybe").is_err());
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(parse_command("/launch").is_err());
        assert_eq!(parse_command("/quit"), Ok(Command::Cancel));
        assert_eq!(parse_command("/accept json"), Ok(Command::Accept { json: true }));
    }

    #[test]
    fn view_tracks_visibility_and_enabled_state() {
        let catalog = CalibrationCatalog::default();
        let mut view = TerminalView::default();
        view.apply(
            &[
                UiEffect::SetVisible(Widget::NetworkGroup, false),
                UiEffect::SetEnabled(Widget::ForwardIpAddress, false),
                UiEffect::SelectRow(0),
            ],
            &catalog,
        );
        assert!(!view.is_visible(Widget::NetworkGroup));
        assert!(!view.is_enabled(Widget::ForwardIpAddress));
        assert!(view.is_enabled(Widget::NetworkGroup));

        view.apply(
            &[
                UiEffect::SetVisible(Widget::NetworkGroup, true),
                UiEffect::SetEnabled(Widget::ForwardIpAddress, true),
            ],
            &catalog,
        );
        assert!(view.is_visible(Widget::NetworkGroup));
        assert!(view.is_enabled(Widget::ForwardIpAddress));
    }

    /// Input that raises the shutdown flag while the line is being read.
    struct InterruptedInput<'a> {
        line: io::Cursor<&'static [u8]>,
        shutdown: &'a AtomicBool,
    }

    impl io::Read for InterruptedInput<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.shutdown.store(true, Ordering::SeqCst);
            io::Read::read(&mut self.line, buf)
        }
    }

    #[test]
    fn command_typed_after_ctrl_c_is_discarded() {
        let mut settings = MemorySettings::new();
        let shutdown = AtomicBool::new(false);
        let input = io::BufReader::new(InterruptedInput {
            line: io::Cursor::new(&b"/accept\n"[..]),
            shutdown: &shutdown,
        });

        let mut dialog = CalibrationDialog::new(&mut settings, ["/share/HDL-32.xml"]);
        let accepted = run_with_input(&mut dialog, input, &shutdown);

        assert!(accepted.is_none());
        assert_eq!(dialog.outcome(), Some(DialogOutcome::Rejected));
        drop(dialog);
        assert!(!settings.contains(keys::CURRENT_ROW));
    }

    #[test]
    fn accept_without_interruption_returns_the_snapshot() {
        let mut settings = MemorySettings::new();
        let shutdown = AtomicBool::new(false);
        let input = io::Cursor::new(&b"/select 1\n/accept\n"[..]);

        let mut dialog = CalibrationDialog::new(&mut settings, ["/share/HDL-32.xml"]);
        let accepted = run_with_input(&mut dialog, input, &shutdown).expect("accepted");

        assert_eq!(accepted.selected_calibration_file(), "/share/HDL-32.xml");
        assert_eq!(dialog.outcome(), Some(DialogOutcome::Accepted));
    }

    #[test]
    fn matrix_formatting_has_four_rows() {
        let lines = format_matrix(&Matrix4::translation(1.0, 2.0, 3.0));
        assert_eq!(lines.len(), 4);
        assert!(lines[0].trim_end().ends_with("1.0000"));
        assert!(!lines[3].contains('-'));
    }
}
