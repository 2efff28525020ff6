#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::PathBuf;
    use tapsyncrs::*;

    #[test]
    fn test_args_with_sample_only() {
        let args = Args::parse_from(["test", "kick.wav"]);
        assert_eq!(args.sample, Some(PathBuf::from("kick.wav")));
        assert_eq!(args.input, None);
        assert_eq!(args.output, None);
        assert!(!args.list_devices);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_args_with_devices() {
        let args = Args::parse_from(["test", "-i", "X1", "--output", "USB Audio", "kick.wav"]);
        assert_eq!(args.input.as_deref(), Some("X1"));
        assert_eq!(args.output.as_deref(), Some("USB Audio"));
    }

    #[test]
    fn test_list_devices_needs_no_sample() {
        let args = Args::parse_from(["test", "-l"]);
        assert!(args.list_devices);
        assert_eq!(args.sample, None);
    }

    #[test]
    fn test_sample_required_otherwise() {
        assert!(Args::try_parse_from(["test", "--dry-run"]).is_err());
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "test",
            "--dry-run",
            "--no-status",
            "-v",
            "-c",
            "tapsync.toml",
            "kick.wav",
        ]);
        assert!(args.dry_run);
        assert!(args.no_status);
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("tapsync.toml")));
    }

    #[test]
    fn test_valid_device_binding() {
        let devices = vec!["Midi Through".to_string(), "Traktor Kontrol X1".to_string()];
        assert!(validate_device("Kontrol", &devices).is_ok());
    }

    #[test]
    fn test_invalid_device_binding() {
        let devices = vec!["Midi Through".to_string()];
        let err = validate_device("Nonexistent Device", &devices).unwrap_err();
        assert!(err.contains("Nonexistent Device"));
        assert!(err.contains("  - Midi Through"));
    }
}
