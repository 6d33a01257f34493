use std::fs;
use std::path::Path;

use vclgen_config::ScopeConfig;
use vclgen_config::defaults::DESIGN_EXCEPTIONS_PATH;
use vclgen_core::{
    BranchNumbering, DirectoryTemplateLocator, GeneratorError, TranspileOptions, VclGenerator,
};
use vclgen_test_support::fixtures::{SAMPLE_SETTINGS, VARNISH6_TEMPLATE, template_dir};

#[test]
fn bundled_template_renders_sample_settings() -> anyhow::Result<()> {
    let dir = template_dir(6, VARNISH6_TEMPLATE)?;
    let generator = VclGenerator::new(
        ScopeConfig::from_json_str(SAMPLE_SETTINGS)?,
        DirectoryTemplateLocator::new(dir.path()),
    );

    let vcl = generator.generate(6, None)?;

    assert!(vcl.contains("    .host = \"web\";\n    .port = \"8080\";"));
    assert!(vcl.contains("acl purge {\n    \"127.0.0.1\";\n    \"10.0.0.0/8\";\n}"));
    assert!(vcl.contains("import xkey;"));
    assert!(vcl.contains("xkey.softpurge(req.http.X-Magento-Tags-Pattern)"));
    assert!(!vcl.contains("xkey.purge("));
    assert!(vcl.contains("if (req.http.cookie ~ \"PHPSESSID=\") {"));
    assert!(vcl.contains("(\\?|&)(utm_source|gclid)="));
    assert!(vcl.contains("unset req.http.X-Forwarded-Proto;"));
    assert!(vcl.contains("if (req.url ~ \"^/(pub/)?media/\") {\n        return (pass);"));
    assert!(vcl.contains(concat!(
        "    if (req.http.user-agent ~ \"(?i)iPhone|Android\") {\n",
        "        hash_data(\"mobile\");\n",
        "    } elsif (req.http.user-agent ~ \"MSIE [5-8]\") {\n",
        "        hash_data(\"legacy\");\n",
        "    }\n}"
    )));
    assert!(vcl.contains("set beresp.grace = 300s;"));
    assert!(vcl.contains("if (beresp.status == 404) {"));
    assert!(!vcl.contains("set resp.http.Pragma"));
    assert!(!vcl.contains("{{"));
    Ok(())
}

#[test]
fn store_scope_selects_its_design_exceptions() -> anyhow::Result<()> {
    let dir = template_dir(6, VARNISH6_TEMPLATE)?;
    let generator = VclGenerator::new(
        ScopeConfig::from_json_str(SAMPLE_SETTINGS)?.with_store("nl"),
        DirectoryTemplateLocator::new(dir.path()),
    );

    let vcl = generator.generate(6, None)?;
    assert!(vcl.contains("if (req.http.user-agent ~ \"Kindle\") {\n        hash_data(\"reader\");"));
    assert!(!vcl.contains("hash_data(\"mobile\")"));
    Ok(())
}

#[test]
fn input_file_overrides_versioned_template() -> anyhow::Result<()> {
    let dir = template_dir(6, VARNISH6_TEMPLATE)?;
    fs::write(dir.path().join("minimal.vcl"), "backend default { .host = \"{{var host}}\"; }")?;
    let generator = VclGenerator::new(
        ScopeConfig::from_json_str(SAMPLE_SETTINGS)?,
        DirectoryTemplateLocator::new(dir.path()),
    );

    let vcl = generator.generate(6, Some(Path::new("minimal.vcl")))?;
    assert_eq!(vcl, "backend default { .host = \"web\"; }");
    Ok(())
}

#[test]
fn missing_version_template_is_an_error() -> anyhow::Result<()> {
    let dir = template_dir(6, VARNISH6_TEMPLATE)?;
    let generator = VclGenerator::new(
        ScopeConfig::default(),
        DirectoryTemplateLocator::new(dir.path()),
    );

    assert!(matches!(
        generator.generate(7, None),
        Err(GeneratorError::TemplateRead { .. })
    ));
    assert!(matches!(
        generator.generate(3, None),
        Err(GeneratorError::UnsupportedVersion { version: 3 })
    ));
    Ok(())
}

#[test]
fn malformed_first_rule_chain_depends_on_numbering() -> anyhow::Result<()> {
    let dir = template_dir(6, "{{var design_exceptions_code}}")?;
    let store = ScopeConfig::default().with_value(
        DESIGN_EXCEPTIONS_PATH,
        r#"[{"regexp":"no delimiters","value":"x"},{"regexp":"/Kindle/","value":"reader"}]"#,
    );

    let faithful = VclGenerator::new(store.clone(), DirectoryTemplateLocator::new(dir.path()));
    assert!(faithful.generate(6, None)?.starts_with(" elsif (req.http.user-agent ~ \"Kindle\")"));

    let repaired = VclGenerator::new(store, DirectoryTemplateLocator::new(dir.path()))
        .with_options(TranspileOptions {
            numbering: BranchNumbering::Emitted,
            ..TranspileOptions::default()
        });
    assert!(repaired.generate(6, None)?.starts_with("if (req.http.user-agent ~ \"Kindle\")"));
    Ok(())
}

#[test]
fn every_bundled_template_renders() -> anyhow::Result<()> {
    let templates = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates");
    let generator = VclGenerator::new(
        ScopeConfig::from_json_str(SAMPLE_SETTINGS)?,
        DirectoryTemplateLocator::new(templates),
    );

    for version in vclgen_core::SUPPORTED_VERSIONS {
        let vcl = generator.generate(version, None)?;
        assert!(vcl.starts_with("vcl 4."), "varnish{version}.vcl header");
        assert!(vcl.contains("hash_data(\"mobile\");"));
        assert!(!vcl.contains("{{"), "varnish{version}.vcl left directives behind");
    }
    Ok(())
}
