use pdf2html::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../pdf2html.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.limits.max_buffer, 2_097_152);
    assert!(!cfg.paths.staging_dir.as_os_str().is_empty());
    assert_eq!(cfg.extractor.program, "java");
    assert!(cfg.rasterizer.timeout().is_none());
    assert_eq!(cfg.naming.buffer_resource_name, "input.pdf");
}
