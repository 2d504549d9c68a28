use crate::{NetplanError, Parser, State};

pub(crate) const TEST_FILE: &str = "10-test.yaml";

/// Parse a single YAML document and import it, panicking on any error.
pub(crate) fn parse_str(content: &str) -> State {
    let mut parser = Parser::new();
    parser.load_yaml_str(TEST_FILE, content).unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    state
}

/// Parse a single YAML document expecting a failure, either during the
/// load or during the import.
pub(crate) fn parse_err(content: &str) -> NetplanError {
    let mut parser = Parser::new();
    if let Err(e) = parser.load_yaml_str(TEST_FILE, content) {
        return e;
    }
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap_err()
}

/// Parse a NetworkManager keyfile and import it.
pub(crate) fn parse_keyfile(filename: &str, content: &str) -> State {
    let mut parser = Parser::new();
    parser.load_keyfile_str(filename, content).unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    state
}

pub(crate) fn dump(state: &State) -> String {
    let mut out = Vec::new();
    state.dump_yaml(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// A fresh scratch directory below the system tmpdir. The caller cleans
/// it up with [std::fs::remove_dir_all].
pub(crate) fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("netplan-test-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
