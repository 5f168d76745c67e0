//! nmap XML parsers
//!
//! Two parsers produce the same object model:
//! - [`StrictParser`] deserializes a complete, well-formed document.
//! - [`IncompleteParser`] walks the document event by event and keeps every
//!   host that was fully written, so interrupted scans can still be loaded.

use crate::types::{Result, ScanReport};

pub mod incomplete;
pub mod xml;

pub use incomplete::IncompleteParser;
pub use xml::StrictParser;

/// Common trait for report parsers
pub trait ReportParser {
    /// Parse XML text into a report. `source` is left empty for the caller to set.
    fn parse(&self, xml: &str) -> Result<ScanReport>;
}

/// Pick the address nmap tools treat as primary: ipv4, then ipv6, then mac
pub(crate) fn primary_address(addresses: &[(String, String)]) -> String {
    ["ipv4", "ipv6", "mac"]
        .iter()
        .find_map(|wanted| {
            addresses
                .iter()
                .find(|(addrtype, _)| addrtype == wanted)
                .map(|(_, addr)| addr.clone())
        })
        .or_else(|| addresses.first().map(|(_, addr)| addr.clone()))
        .unwrap_or_default()
}

/// Fill host totals from the parsed hosts when `<runstats>` was missing
pub(crate) fn derive_host_totals(report: &mut ScanReport) {
    let up = report.hosts.iter().filter(|h| h.is_up()).count() as u32;
    let total = report.hosts.len() as u32;
    report.hosts_total = total;
    report.hosts_up = up;
    report.hosts_down = total - up;
}

/// A complete two-host report shared by the parser tests
#[cfg(test)]
pub(crate) const SAMPLE_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<?xml-stylesheet href="file:///usr/share/nmap/nmap.xsl" type="text/xsl"?>
<nmaprun scanner="nmap" args="nmap -sV -O -oX scan.xml 10.0.0.0/30" start="1700000000" startstr="Tue Nov 14 22:13:20 2023" version="7.94" xmloutputversion="1.05">
  <scaninfo type="syn" protocol="tcp" numservices="1000" services="1-1000"/>
  <verbose level="0"/>
  <debugging level="0"/>
  <host starttime="1700000001" endtime="1700000100">
    <status state="up" reason="arp-response" reason_ttl="0"/>
    <address addr="10.0.0.1" addrtype="ipv4"/>
    <address addr="AA:BB:CC:DD:EE:01" addrtype="mac" vendor="TestVendor"/>
    <hostnames>
      <hostname name="web.example.com" type="user"/>
      <hostname name="www.example.com" type="PTR"/>
    </hostnames>
    <ports>
      <extraports state="closed" count="998"/>
      <port protocol="tcp" portid="22">
        <state state="open" reason="syn-ack" reason_ttl="64"/>
        <service name="ssh" product="OpenSSH" version="8.9p1" extrainfo="Ubuntu Linux; protocol 2.0" method="probed" conf="10"/>
      </port>
      <port protocol="tcp" portid="443">
        <state state="open" reason="syn-ack" reason_ttl="64"/>
        <service name="http" product="nginx" version="1.18.0" tunnel="ssl" method="probed" conf="10"/>
      </port>
    </ports>
    <os>
      <portused state="open" proto="tcp" portid="22"/>
      <osmatch name="Linux 4.15 - 5.8" accuracy="95" line="1">
        <osclass type="general purpose" vendor="Linux" osfamily="Linux" osgen="4.X" accuracy="95"/>
        <osclass type="general purpose" vendor="Linux" osfamily="Linux" accuracy="90"/>
      </osmatch>
    </os>
  </host>
  <host starttime="1700000001" endtime="1700000100">
    <status state="up" reason="arp-response" reason_ttl="0"/>
    <address addr="10.0.0.2" addrtype="ipv4"/>
    <hostnames/>
    <ports>
      <port protocol="udp" portid="161">
        <state state="open|filtered" reason="no-response" reason_ttl="0"/>
      </port>
    </ports>
  </host>
  <runstats>
    <finished time="1700000120" timestr="Tue Nov 14 22:15:20 2023" summary="Nmap done at Tue Nov 14 22:15:20 2023; 4 IP addresses (2 hosts up) scanned in 120.00 seconds" elapsed="120.00" exit="success"/>
    <hosts up="2" down="2" total="4"/>
  </runstats>
</nmaprun>
"#;
