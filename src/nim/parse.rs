use crate::nim::types::{AttrValue, AttributeMap};

/// niminfo keys whose values are space-separated lists
const LIST_KEY_MARKERS: [&str; 3] = ["hosts", "routes", "mounts"];

/// Parse the contents of a niminfo file.
///
/// Each meaningful line looks like:
///
/// ```text
/// export NIM_NAME=client1
/// export NIM_HOSTNAME=client1.example.com
/// export NIM_ROUTES="default:0:10.0.0.1"
/// ```
///
/// Anything else (comments, blank lines) is skipped.
pub fn parse_niminfo(text: &str) -> AttributeMap {
    let mut map = AttributeMap::new();

    for line in text.lines() {
        let Some((raw_key, raw_value)) = split_export_line(line) else {
            continue;
        };

        let key = raw_key.replace("NIM_", "").to_lowercase();
        let value = raw_value.replace('"', "");

        let value = if is_list_key(&key) {
            AttrValue::List(value.split_whitespace().map(str::to_string).collect())
        } else {
            AttrValue::Scalar(value)
        };
        map.insert(key, value);
    }

    map
}

/// Match `export<ws><KEY>=<VALUE>` where KEY is uppercase letters and
/// underscores and VALUE is non-empty.
fn split_export_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches('\r');
    let rest = line.strip_prefix("export")?;
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return None;
    }

    let key_len = trimmed
        .find(|c: char| !(c.is_uppercase() || c == '_'))
        .unwrap_or(trimmed.len());
    if key_len == 0 {
        return None;
    }

    let (key, rest) = trimmed.split_at(key_len);
    let value = rest.strip_prefix('=')?;
    if value.is_empty() {
        return None;
    }
    Some((key, value))
}

pub fn is_list_key(key: &str) -> bool {
    LIST_KEY_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Parse `lsnim -l` style output: an unindented header followed by
/// indented `key = value` lines.
pub fn parse_attribute_list(text: &str) -> AttributeMap {
    let mut map = AttributeMap::new();

    for line in text.lines() {
        if !line.starts_with([' ', '\t']) {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), AttrValue::Scalar(value.trim().to_string()));
    }

    map
}

/// Render the first whitespace-delimited token of every non-blank line.
pub fn listed_names(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Drop one trailing line ending from command output.
pub fn chomp(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> AttrValue {
        AttrValue::Scalar(s.to_string())
    }

    fn list(items: &[&str]) -> AttrValue {
        AttrValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    /// Render a parsed map back into niminfo form.
    fn to_niminfo(map: &AttributeMap) -> String {
        map.iter()
            .map(|(k, v)| format!("export NIM_{}=\"{}\"\n", k.to_uppercase(), v))
            .collect()
    }

    const MASTER_NIMINFO: &str = r#"#------------------ Network Install Manager ---------------
# warning - this file contains NIM configuration information
#       and should only be updated by NIM
export NIM_NAME=master
export NIM_CONFIGURATION=master
export NIM_MASTER_PORT=1058
export NIM_REGISTRATION_PORT=1059
export NIM_MASTER_HOSTNAME=nim01.example.com
export NIM_HOSTS=" 127.0.0.1:loopback:localhost  10.1.1.10:nim01.example.com "
export NIM_MOUNTS=""
export ROUTES=""
"#;

    #[test]
    fn test_parse_scenario() {
        let map = parse_niminfo("export NIM_NAME=foo\nexport NIM_ROUTES=\"10.0.0.1 10.0.0.2\"\n");
        assert_eq!(map.len(), 2);
        assert_eq!(map["name"], scalar("foo"));
        assert_eq!(map["routes"], list(&["10.0.0.1", "10.0.0.2"]));
    }

    #[test]
    fn test_parse_master_niminfo() {
        let map = parse_niminfo(MASTER_NIMINFO);
        assert_eq!(map["configuration"], scalar("master"));
        assert_eq!(map["master_port"], scalar("1058"));
        assert_eq!(map["master_hostname"], scalar("nim01.example.com"));
        assert_eq!(
            map["hosts"],
            list(&["127.0.0.1:loopback:localhost", "10.1.1.10:nim01.example.com"])
        );
        assert_eq!(map["mounts"], list(&[]));
        assert_eq!(map["routes"], list(&[]));
        assert_eq!(map.len(), 8);
    }

    #[test]
    fn test_list_keys_always_lists() {
        let map = parse_niminfo("export NIM_HOSTS=single\nexport NIM_MOUNTS=\"\"\nexport NIM_NAME=\"a b\"\n");
        assert_eq!(map["hosts"], list(&["single"]));
        assert_eq!(map["mounts"], list(&[]));
        assert_eq!(map["name"], scalar("a b"));
    }

    #[test]
    fn test_skips_non_matching_lines() {
        let text = "\
# comment
NIM_NAME=nope
export nim_name=lower
export NIM_NAME=
exportNIM_NAME=glued
export NIM_2=digits
  export NIM_NAME=indented
export NIM_CONFIGURATION=standalone
";
        let map = parse_niminfo(text);
        assert_eq!(map.len(), 1);
        assert_eq!(map["configuration"], scalar("standalone"));
    }

    #[test]
    fn test_nim_marker_removed_anywhere() {
        let map = parse_niminfo("export NIM_MASTERID_NIM_X=1\nexport FOO_NIM_BAR=\"quoted=value\"\n");
        assert_eq!(map["masterid_x"], scalar("1"));
        assert_eq!(map["foo_bar"], scalar("quoted=value"));
    }

    #[test]
    fn test_niminfo_reparse_is_stable() {
        let first = parse_niminfo(MASTER_NIMINFO);
        let second = parse_niminfo(&to_niminfo(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_attribute_list() {
        let text = "\
client1:
   class          = machines
   type           = standalone
   connect        = nimsh
   platform       = chrp
   if1            = net_10_1_1 client1 0
   Cstate         = ready for a NIM operation
   comments       = a = b
not indented = skipped
   no separator here
";
        let map = parse_attribute_list(text);
        assert_eq!(map["class"], scalar("machines"));
        assert_eq!(map["connect"], scalar("nimsh"));
        assert_eq!(map["if1"], scalar("net_10_1_1 client1 0"));
        assert_eq!(map["Cstate"], scalar("ready for a NIM operation"));
        assert_eq!(map["comments"], scalar("a = b"));
        assert!(!map.contains_key("not indented"));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn test_listed_names() {
        let text = "client1   machines   standalone\n\nclient2 machines standalone\n";
        assert_eq!(listed_names(text), vec!["client1", "client2"]);
    }

    #[test]
    fn test_chomp() {
        assert_eq!(chomp("7200-05-03-2148\n".to_string()), "7200-05-03-2148");
        assert_eq!(chomp("7200\r\n".to_string()), "7200");
        assert_eq!(chomp(String::new()), "");
    }
}
