// Linux-specific helpers: /proc and /sys readers for what sysinfo does not expose
// (connection tables, link state, drop counters, CPU time breakdown, disk I/O).
// Parsers take file contents so they can be tested anywhere; readers degrade to
// empty/None off Linux.

use crate::models::{
    Connection, CpuCounters, CpuTimesPercent, DiskIoCounters, Duplex, RawLinkStats,
    RemoteEndpoint, SocketFamily, SocketKind, TrafficSample,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Connection row before the owning pid is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SocketRow {
    pub connection: Connection,
    pub inode: u64,
}

#[cfg(target_os = "linux")]
const TCP_TABLES: [(&str, SocketFamily, SocketKind); 4] = [
    ("/proc/net/tcp", SocketFamily::Inet, SocketKind::Tcp),
    ("/proc/net/tcp6", SocketFamily::Inet6, SocketKind::Tcp),
    ("/proc/net/udp", SocketFamily::Inet, SocketKind::Udp),
    ("/proc/net/udp6", SocketFamily::Inet6, SocketKind::Udp),
];

fn tcp_state(code: &str) -> &'static str {
    match code {
        "01" => "ESTABLISHED",
        "02" => "SYN_SENT",
        "03" => "SYN_RECV",
        "04" => "FIN_WAIT1",
        "05" => "FIN_WAIT2",
        "06" => "TIME_WAIT",
        "07" => "CLOSE",
        "08" => "CLOSE_WAIT",
        "09" => "LAST_ACK",
        "0A" => "LISTEN",
        "0B" => "CLOSING",
        "0C" => "NEW_SYN_RECV",
        _ => "NONE",
    }
}

/// Decode `HEXADDR:HEXPORT` as printed by the kernel (address words in host order).
fn decode_endpoint(text: &str, family: SocketFamily) -> Option<(IpAddr, u16)> {
    let (addr, port) = text.split_once(':')?;
    let port = u16::from_str_radix(port, 16).ok()?;
    let ip = match family {
        SocketFamily::Inet => {
            if addr.len() != 8 {
                return None;
            }
            let word = u32::from_str_radix(addr, 16).ok()?;
            IpAddr::V4(Ipv4Addr::from(word.to_ne_bytes()))
        }
        SocketFamily::Inet6 => {
            if addr.len() != 32 {
                return None;
            }
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_mut(4).enumerate() {
                let word = u32::from_str_radix(&addr[i * 8..i * 8 + 8], 16).ok()?;
                chunk.copy_from_slice(&word.to_ne_bytes());
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    };
    Some((ip, port))
}

/// Parse one `/proc/net/{tcp,udp}[6]` table. Malformed rows are skipped.
pub(super) fn parse_socket_table(
    content: &str,
    family: SocketFamily,
    kind: SocketKind,
) -> Vec<SocketRow> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 10 {
                return None;
            }
            let (local_ip, local_port) = decode_endpoint(fields[1], family)?;
            let (remote_ip, remote_port) = decode_endpoint(fields[2], family)?;
            let remote = if remote_ip.is_unspecified() && remote_port == 0 {
                None
            } else {
                Some(RemoteEndpoint {
                    address: remote_ip.to_string(),
                    port: remote_port,
                })
            };
            let status = match kind {
                SocketKind::Tcp => tcp_state(fields[3]),
                SocketKind::Udp => "NONE",
            };
            Some(SocketRow {
                connection: Connection {
                    family,
                    kind,
                    local_address: local_ip.to_string(),
                    local_port,
                    remote,
                    status: status.to_string(),
                    pid: None,
                },
                inode: fields[9].parse().ok()?,
            })
        })
        .collect()
}

/// `socket:[12345]` -> 12345
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn socket_inode(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?.strip_suffix(']')?.parse().ok()
}

/// Map socket inode -> owning pid by scanning `/proc/<pid>/fd`. Processes we
/// may not inspect are skipped, so some sockets stay without a pid.
#[cfg(target_os = "linux")]
fn socket_owners() -> HashMap<u64, u32> {
    let mut owners = HashMap::new();
    let Ok(procs) = std::fs::read_dir("/proc") else {
        return owners;
    };
    for entry in procs.flatten() {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        let Ok(fds) = std::fs::read_dir(entry.path().join("fd")) else {
            continue;
        };
        for fd in fds.flatten() {
            if let Ok(target) = std::fs::read_link(fd.path())
                && let Some(inode) = target.to_str().and_then(socket_inode)
            {
                owners.entry(inode).or_insert(pid);
            }
        }
    }
    owners
}

pub(super) fn read_connections() -> std::io::Result<Vec<Connection>> {
    #[cfg(target_os = "linux")]
    {
        let mut rows = Vec::new();
        for (path, family, kind) in TCP_TABLES {
            match std::fs::read_to_string(path) {
                Ok(content) => rows.extend(parse_socket_table(&content, family, kind)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        let owners = socket_owners();
        return Ok(rows
            .into_iter()
            .map(|row| {
                let mut conn = row.connection;
                conn.pid = owners.get(&row.inode).copied();
                conn
            })
            .collect());
    }
    #[cfg(not(target_os = "linux"))]
    Ok(Vec::new())
}

const IFF_NAMES: [(u32, &str); 16] = [
    (0x1, "up"),
    (0x2, "broadcast"),
    (0x4, "debug"),
    (0x8, "loopback"),
    (0x10, "pointopoint"),
    (0x20, "notrailers"),
    (0x40, "running"),
    (0x80, "noarp"),
    (0x100, "promisc"),
    (0x200, "allmulti"),
    (0x400, "master"),
    (0x800, "slave"),
    (0x1000, "multicast"),
    (0x2000, "portsel"),
    (0x4000, "automedia"),
    (0x8000, "dynamic"),
];
const IFF_UP: u32 = 0x1;
const IFF_RUNNING: u32 = 0x40;

/// `0x1003` -> 0x1003
pub(super) fn parse_flag_bits(text: &str) -> Option<u32> {
    let text = text.trim();
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(hex, 16).ok()
}

/// Comma-joined flag names, in bit order.
pub(super) fn flag_names(bits: u32) -> String {
    IFF_NAMES
        .iter()
        .filter(|(bit, _)| bits & bit != 0)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(",")
}

pub(super) fn parse_duplex(text: &str) -> Duplex {
    match text.trim() {
        "full" => Duplex::Full,
        "half" => Duplex::Half,
        _ => Duplex::Unknown,
    }
}

/// Link stats from the contents of `/sys/class/net/<if>/{flags,duplex,speed,mtu}`.
/// Unreadable files count as unknown: down, unknown duplex, zero speed/mtu.
pub(super) fn link_stats_from(
    flags: Option<&str>,
    duplex: Option<&str>,
    speed: Option<&str>,
    mtu: Option<&str>,
) -> RawLinkStats {
    let bits = flags.and_then(parse_flag_bits).unwrap_or(0);
    RawLinkStats {
        is_up: bits & IFF_UP != 0 && bits & IFF_RUNNING != 0,
        duplex: duplex.map(parse_duplex).unwrap_or(Duplex::Unknown),
        speed_mbps: speed
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|s| *s > 0)
            .map(|s| s as u64)
            .unwrap_or(0),
        mtu: mtu.and_then(|s| s.trim().parse().ok()).unwrap_or(0),
        flags: flag_names(bits),
    }
}

/// Link stats for every interface under `/sys/class/net`.
#[cfg_attr(not(target_os = "linux"), allow(unused_mut))]
pub(super) fn read_link_stats() -> HashMap<String, RawLinkStats> {
    let mut stats = HashMap::new();
    #[cfg(target_os = "linux")]
    {
        let Ok(entries) = std::fs::read_dir("/sys/class/net") else {
            return stats;
        };
        for entry in entries.flatten() {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let dir = entry.path();
            let read = |file: &str| std::fs::read_to_string(dir.join(file)).ok();
            let (flags, duplex, speed, mtu) =
                (read("flags"), read("duplex"), read("speed"), read("mtu"));
            stats.insert(
                name,
                link_stats_from(
                    flags.as_deref(),
                    duplex.as_deref(),
                    speed.as_deref(),
                    mtu.as_deref(),
                ),
            );
        }
    }
    stats
}

/// Sum of all interfaces in `/proc/net/dev`. Sums wrap like the kernel counters.
pub(super) fn parse_net_dev(content: &str) -> TrafficSample {
    let mut total = TrafficSample::default();
    for line in content.lines().skip(2) {
        let Some((_, counters)) = line.split_once(':') else {
            continue;
        };
        let v: Vec<u64> = counters
            .split_whitespace()
            .map(|f| f.parse().unwrap_or(0))
            .collect();
        if v.len() < 16 {
            continue;
        }
        total.recv_bytes = total.recv_bytes.wrapping_add(v[0]);
        total.packets_recv = total.packets_recv.wrapping_add(v[1]);
        total.err_in = total.err_in.wrapping_add(v[2]);
        total.drop_in = total.drop_in.wrapping_add(v[3]);
        total.sent_bytes = total.sent_bytes.wrapping_add(v[8]);
        total.packets_sent = total.packets_sent.wrapping_add(v[9]);
        total.err_out = total.err_out.wrapping_add(v[10]);
        total.drop_out = total.drop_out.wrapping_add(v[11]);
    }
    total
}

pub(super) fn read_net_dev() -> Option<TrafficSample> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/net/dev").ok()?;
        return Some(parse_net_dev(&content));
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Aggregate jiffies from the `cpu ` line of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct CpuTimes {
    user: u64,
    nice: u64,
    system: u64,
    idle: u64,
    iowait: u64,
    irq: u64,
    softirq: u64,
    steal: u64,
    guest: u64,
    guest_nice: u64,
}

impl CpuTimes {
    /// Guest time is already part of user/nice, so it is left out of the total.
    fn busy_total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Share of each state between `previous` and `self`, in percent.
    pub(super) fn percent_since(&self, previous: &CpuTimes) -> CpuTimesPercent {
        let total = self.busy_total().saturating_sub(previous.busy_total());
        if total == 0 {
            return CpuTimesPercent::default();
        }
        let pct = |now: u64, before: u64| now.saturating_sub(before) as f64 * 100.0 / total as f64;
        CpuTimesPercent {
            user: pct(self.user, previous.user),
            nice: pct(self.nice, previous.nice),
            system: pct(self.system, previous.system),
            idle: pct(self.idle, previous.idle),
            iowait: pct(self.iowait, previous.iowait),
            irq: pct(self.irq, previous.irq),
            softirq: pct(self.softirq, previous.softirq),
            steal: pct(self.steal, previous.steal),
            guest: pct(self.guest, previous.guest),
            guest_nice: pct(self.guest_nice, previous.guest_nice),
        }
    }
}

pub(super) fn parse_cpu_times(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let mut v = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse::<u64>().unwrap_or(0));
    let mut next = || v.next().unwrap_or(0);
    Some(CpuTimes {
        user: next(),
        nice: next(),
        system: next(),
        idle: next(),
        iowait: next(),
        irq: next(),
        softirq: next(),
        steal: next(),
        guest: next(),
        guest_nice: next(),
    })
}

/// Context switches and interrupt totals. Linux has no syscall counter here.
pub(super) fn parse_cpu_counters(stat: &str) -> CpuCounters {
    let mut counters = CpuCounters::default();
    for line in stat.lines() {
        let mut fields = line.split_whitespace();
        let key = fields.next();
        let first = fields.next().and_then(|f| f.parse::<u64>().ok());
        match (key, first) {
            (Some("ctxt"), Some(v)) => counters.ctx_switches = v,
            (Some("intr"), Some(v)) => counters.interrupts = v,
            (Some("softirq"), Some(v)) => counters.soft_interrupts = v,
            _ => {}
        }
    }
    counters
}

pub(super) fn read_proc_stat() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        return std::fs::read_to_string("/proc/stat").ok();
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Min/max scaling frequency of cpu0 in MHz, from sysfs (reported in kHz).
pub(super) fn read_cpu_freq_bounds() -> Option<(f64, f64)> {
    #[cfg(target_os = "linux")]
    {
        let read_mhz = |file: &str| -> Option<f64> {
            let path = format!("/sys/devices/system/cpu/cpu0/cpufreq/{}", file);
            let khz: f64 = std::fs::read_to_string(path).ok()?.trim().parse().ok()?;
            Some(khz / 1000.0)
        };
        return Some((read_mhz("cpuinfo_min_freq")?, read_mhz("cpuinfo_max_freq")?));
    }
    #[cfg(not(target_os = "linux"))]
    None
}

const SECTOR_SIZE: u64 = 512;

/// Sum of the named whole disks in `/proc/diskstats`.
pub(super) fn parse_diskstats(content: &str, disks: &[String]) -> DiskIoCounters {
    let mut io = DiskIoCounters::default();
    for line in content.lines() {
        let f: Vec<&str> = line.split_whitespace().collect();
        if f.len() < 11 || !disks.iter().any(|d| d == f[2]) {
            continue;
        }
        let n = |i: usize| f[i].parse::<u64>().unwrap_or(0);
        io.read_count = io.read_count.wrapping_add(n(3));
        io.read_bytes = io.read_bytes.wrapping_add(n(5).wrapping_mul(SECTOR_SIZE));
        io.read_time_ms = io.read_time_ms.wrapping_add(n(6));
        io.write_count = io.write_count.wrapping_add(n(7));
        io.write_bytes = io.write_bytes.wrapping_add(n(9).wrapping_mul(SECTOR_SIZE));
        io.write_time_ms = io.write_time_ms.wrapping_add(n(10));
    }
    io
}

/// Whole-disk I/O counters; loop and ram devices are ignored.
pub(super) fn read_disk_io() -> Option<DiskIoCounters> {
    #[cfg(target_os = "linux")]
    {
        let disks: Vec<String> = std::fs::read_dir("/sys/block")
            .ok()?
            .flatten()
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|n| !n.starts_with("loop") && !n.starts_with("ram"))
            .collect();
        let content = std::fs::read_to_string("/proc/diskstats").ok()?;
        return Some(parse_diskstats(&content, &disks));
    }
    #[cfg(not(target_os = "linux"))]
    None
}
