//! Helpers for formatting `protoc` plugin flags.
//!
//! `protoc` accepts parameters either inline (`--go_out=a,b:out`) or through
//! a separate `--go_opt=a` flag. Modules use these helpers so that the host
//! can recognise which plugin family a flag belongs to.

/// Format `--<family>_out=<path>`, or `--<family>_out=<params>:<path>` when
/// inline parameters are given.
pub fn output_flag(family: &str, params: &[String], path: &str) -> String {
    if params.is_empty() {
        format!("--{}_out={}", family, path)
    } else {
        format!("--{}_out={}:{}", family, params.join(","), path)
    }
}

/// One `--<family>_opt=<option>` flag per option, in order.
pub fn option_flags(family: &str, options: &[String]) -> Vec<String> {
    options
        .iter()
        .map(|opt| format!("--{}_opt={}", family, opt))
        .collect()
}

/// Plugin family of an output flag (`--go_out=...` is family `go`).
///
/// Returns `None` for anything that is not a `--<family>_out` flag.
pub fn output_family(flag: &str) -> Option<&str> {
    let name = flag.strip_prefix("--")?;
    let name = name.split_once('=').map_or(name, |(n, _)| n);
    name.strip_suffix("_out").filter(|family| !family.is_empty())
}

/// Plugin family of an option flag (`--go_opt=...` is family `go`).
pub fn option_family(flag: &str) -> Option<&str> {
    let name = flag.strip_prefix("--")?;
    let name = name.split_once('=').map_or(name, |(n, _)| n);
    name.strip_suffix("_opt").filter(|family| !family.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_flag_without_params() {
        assert_eq!(output_flag("go", &[], "gen/go"), "--go_out=gen/go");
    }

    #[test]
    fn test_output_flag_with_inline_params() {
        let params = vec!["plugins=grpc".to_string(), "paths=source_relative".to_string()];
        assert_eq!(
            output_flag("go", &params, "gen/go"),
            "--go_out=plugins=grpc,paths=source_relative:gen/go"
        );
    }

    #[test]
    fn test_option_flags_preserve_order() {
        let opts = vec!["b=2".to_string(), "a=1".to_string()];
        assert_eq!(option_flags("go", &opts), vec!["--go_opt=b=2", "--go_opt=a=1"]);
    }

    #[test]
    fn test_output_family() {
        assert_eq!(output_family("--go_out=gen/go"), Some("go"));
        assert_eq!(output_family("--go-grpc_out=gen/go"), Some("go-grpc"));
        assert_eq!(output_family("--go_opt=paths=source_relative"), None);
        assert_eq!(output_family("--plugin=protoc-gen-grpc=grpc_cpp_plugin"), None);
        assert_eq!(output_family("--_out=x"), None);
        assert_eq!(output_family("-Iproto"), None);
    }

    #[test]
    fn test_option_family() {
        assert_eq!(option_family("--go_opt=paths=source_relative"), Some("go"));
        assert_eq!(option_family("--go-grpc_opt=x"), Some("go-grpc"));
        assert_eq!(option_family("--go_out=gen/go"), None);
        assert_eq!(option_family("--_opt=x"), None);
    }
}
