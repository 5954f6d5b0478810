//! Plain-text rendering of records

use crate::Result;
use ovc_api::{Cloudspace, Forward, Vm};
use std::fmt::Write;

// Column widths
const ID_WIDTH: usize = 8;
const NAME_WIDTH: usize = 26;
const STATUS_WIDTH: usize = 12;
const ADDRESS_WIDTH: usize = 22;

pub fn cloudspaces_table(cloudspaces: &[Cloudspace]) -> String {
    if cloudspaces.is_empty() {
        return "No cloudspaces found.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<STATUS_WIDTH$} EXTERNAL IP",
        "ID", "NAME", "STATUS"
    );
    let _ = writeln!(out, "{}", "-".repeat(70));
    for cs in cloudspaces {
        let _ = writeln!(
            out,
            "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<STATUS_WIDTH$} {}",
            cs.id,
            truncate(&cs.name, NAME_WIDTH),
            cs.status,
            cs.external_ip.as_deref().unwrap_or("-")
        );
    }
    out.trim_end().to_string()
}

pub fn vms_table(vms: &[Vm]) -> String {
    if vms.is_empty() {
        return "No machines found.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<STATUS_WIDTH$} IP ADDRESS",
        "ID", "NAME", "STATUS"
    );
    let _ = writeln!(out, "{}", "-".repeat(70));
    for vm in vms {
        let _ = writeln!(
            out,
            "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<STATUS_WIDTH$} {}",
            vm.id,
            truncate(&vm.name, NAME_WIDTH),
            vm.status.to_string(),
            vm.ip_address().unwrap_or("-")
        );
    }
    out.trim_end().to_string()
}

pub fn forwards_table(forwards: &[Forward]) -> String {
    if forwards.is_empty() {
        return "No port forwards found.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$} {:<ADDRESS_WIDTH$} {:<ADDRESS_WIDTH$} PROTOCOL",
        "MACHINE", "PUBLIC", "LOCAL"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));
    for fwd in forwards {
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$} {:<ADDRESS_WIDTH$} {:<ADDRESS_WIDTH$} {}",
            truncate(&fwd.machine_name, NAME_WIDTH),
            format!("{}:{}", fwd.public_ip, fwd.public_port),
            format!("{}:{}", fwd.local_ip, fwd.local_port),
            fwd.protocol
        );
    }
    out.trim_end().to_string()
}

/// `web1 1.2.3.4:3500 -> 10.0.0.5:22 tcp`
pub fn forward_line(forward: &Forward) -> String {
    format!(
        "{} {}:{} -> {}:{} {}",
        forward.machine_name,
        forward.public_ip,
        forward.public_port,
        forward.local_ip,
        forward.local_port,
        forward.protocol
    )
}

/// Full record as YAML, including fields without a typed counterpart
pub fn vm_yaml(vm: &Vm) -> Result<String> {
    Ok(serde_yaml::to_string(vm)?.trim_end().to_string())
}

/// Address and login accounts of a freshly created machine
pub fn vm_summary(vm: &Vm) -> String {
    let mut out = format!("VM {}: {}", vm.name, vm.ip_address().unwrap_or("-"));
    for account in &vm.accounts {
        let _ = write!(out, "\n\tUser: {} / {}", account.login, account.password);
    }
    out
}

/// How to reach a machine through its SSH forward
pub fn ssh_hint(cloudspace: &Cloudspace, forward: &Forward) -> String {
    let host = cloudspace
        .external_ip
        .as_deref()
        .filter(|ip| !ip.is_empty())
        .unwrap_or(&forward.public_ip);
    format!("ssh -p {} root@{}", forward.public_port, host)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
