//! Version stamping of the WiX installer descriptor.
//!
//! Reads the descriptor, replaces the version placeholders at a fixed set
//! of positions and writes the result without an XML declaration:
//!
//! - `Wix/Product@Name` and `Wix/Product@Version`
//! - the `CurrentVersion` registry value
//! - the `JavaHome` registry key
//! - the `INSTALLDIR` directory name
//!
//! Every lookup is an immediate-child scan keyed by element name or `Id`,
//! so sibling order in the descriptor does not matter.

mod error;

pub use error::{Result, StampError, StructureError};

use std::path::Path;

use crate::descriptor::{Document, Element};

/// Replaced by the feature version, e.g. `21`.
pub const PLACEHOLDER_VERSION_FEATURE: &str = "PLACEHOLDER_VERSION_FEATURE";
/// Replaced by the dotted version, e.g. `21.0.2`.
pub const PLACEHOLDER_VERSION_NUMBER: &str = "PLACEHOLDER_VERSION_NUMBER";
/// Replaced by the four-position version, e.g. `21.0.2.0`.
pub const PLACEHOLDER_VERSION_NUMBER_FOUR_POSITIONS: &str = "PLACEHOLDER_VERSION_NUMBER_FOUR_POSITIONS";

const ID: &str = "Id";

const CURRENT_VERSION_PATH: [&str; 2] = [
    "comp_registry_runtime_current_version",
    "registry_runtime_current_version",
];
const JAVA_HOME_PATH: [&str; 2] = ["comp_registry_runtime_java_home", "registry_runtime_java_home"];
const INSTALL_DIR_PATH: [&str; 4] = ["TARGETDIR", "ProgramFiles64Folder", "dir_vendor", "INSTALLDIR"];

/// Version strings substituted into the descriptor. Not validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versions {
    /// Feature release number, e.g. `21`
    pub feature: String,
    /// Dotted version number, e.g. `21.0.2`
    pub number: String,
    /// Four-position version number, e.g. `21.0.2.0`
    pub number_four_positions: String,
}

impl Versions {
    pub fn new(
        feature: impl Into<String>,
        number: impl Into<String>,
        number_four_positions: impl Into<String>,
    ) -> Self {
        Self {
            feature: feature.into(),
            number: number.into(),
            number_four_positions: number_four_positions.into(),
        }
    }
}

/// Number of placeholder occurrences replaced at each stamped position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StampReport {
    pub product_name: usize,
    pub product_version: usize,
    pub current_version: usize,
    pub java_home_key: usize,
    pub install_dir_name: usize,
}

impl StampReport {
    /// Total replacements across all positions.
    pub fn total(&self) -> usize {
        self.product_name
            + self.product_version
            + self.current_version
            + self.java_home_key
            + self.install_dir_name
    }
}

/// Stamps `src` with `versions` and writes the result to `dest`.
///
/// Nothing is written unless every lookup succeeds. An existing `dest` is
/// overwritten; its parent directory must exist.
pub async fn stamp(src: &Path, dest: &Path, versions: &Versions) -> Result<StampReport> {
    if !tokio::fs::try_exists(src).await.unwrap_or(false) {
        return Err(StampError::InputNotFound {
            path: src.to_path_buf(),
        });
    }

    log::info!("Stamping descriptor {} -> {}", src.display(), dest.display());

    let mut doc = Document::load(src).await.map_err(|source| StampError::Parse {
        path: src.to_path_buf(),
        source,
    })?;

    if doc.had_declaration() {
        log::debug!("Dropping XML declaration of {}", src.display());
    }

    let report = stamp_document(&mut doc, versions)?;

    let xml = doc.to_xml_string().map_err(|e| StampError::Write {
        path: dest.to_path_buf(),
        source: std::io::Error::other(e),
    })?;
    tokio::fs::write(dest, xml)
        .await
        .map_err(|source| StampError::Write {
            path: dest.to_path_buf(),
            source,
        })?;

    log::info!(
        "✓ Stamped {} placeholder(s) into {}",
        report.total(),
        dest.display()
    );
    Ok(report)
}

/// Applies the placeholder substitutions to a parsed descriptor in place.
pub fn stamp_document(doc: &mut Document, versions: &Versions) -> Result<StampReport> {
    let product = find_product(doc)?;
    let mut report = StampReport::default();

    report.product_name = replace(product, "Product", "Name", PLACEHOLDER_VERSION_NUMBER, &versions.number)?;
    report.product_version = replace(
        product,
        "Product",
        "Version",
        PLACEHOLDER_VERSION_NUMBER_FOUR_POSITIONS,
        &versions.number_four_positions,
    )?;

    let current_version = find_registry_value_current_version(product)?;
    report.current_version = replace(
        current_version,
        "CurrentVersion",
        "Value",
        PLACEHOLDER_VERSION_NUMBER,
        &versions.number,
    )?;

    let java_home = descend(product, &JAVA_HOME_PATH)?;
    report.java_home_key = replace(
        java_home,
        JAVA_HOME_PATH[1],
        "Key",
        PLACEHOLDER_VERSION_NUMBER,
        &versions.number,
    )?;

    let install_dir = descend(product, &INSTALL_DIR_PATH)?;
    report.install_dir_name = replace(
        install_dir,
        INSTALL_DIR_PATH[3],
        "Name",
        PLACEHOLDER_VERSION_FEATURE,
        &versions.feature,
    )?;

    log::debug!("Stamp report: {:?}", report);
    Ok(report)
}

/// Locates `Wix/Product`, looking only one and two levels deep.
fn find_product(doc: &mut Document) -> Result<&mut Element> {
    let root = doc.root_mut();
    if root.name() != "Wix" {
        return Err(StructureError::ProductNotFound.into());
    }
    root.find_child_named_mut("Product")
        .ok_or_else(|| StructureError::ProductNotFound.into())
}

fn find_registry_value_current_version(product: &mut Element) -> Result<&mut Element> {
    let key = descend(product, &CURRENT_VERSION_PATH)?;
    key.child_elements_mut()
        .find(|child| child.name() == "RegistryValue" && child.attribute("Name") == Some("CurrentVersion"))
        .ok_or_else(|| {
            StructureError::RegistryValueNotFound {
                name: "CurrentVersion".to_string(),
            }
            .into()
        })
}

fn descend<'e>(from: &'e mut Element, path: &[&str]) -> Result<&'e mut Element> {
    from.descend_mut(ID, path).map_err(|id| {
        log::debug!("Lookup chain {:?} stopped at {}", path, id);
        StructureError::ChildNotFound { id: id.to_string() }.into()
    })
}

fn replace(element: &mut Element, key: &str, attribute: &str, token: &str, value: &str) -> Result<usize> {
    element
        .replace_in_attribute(attribute, token, value)
        .ok_or_else(|| {
            StructureError::AttributeNotFound {
                element: key.to_string(),
                attribute: attribute.to_string(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Wix xmlns="http://schemas.microsoft.com/wix/2006/wi">
  <Product Id="*" Name="app-PLACEHOLDER_VERSION_NUMBER" Version="PLACEHOLDER_VERSION_NUMBER_FOUR_POSITIONS">
    <Component Id="comp_registry_runtime_java_home">
      <RegistryKey Id="registry_runtime_java_home" Root="HKLM" Key="Software\JavaSoft\JDK\PLACEHOLDER_VERSION_NUMBER"/>
    </Component>
    <Component Id="comp_registry_runtime_current_version">
      <RegistryKey Id="registry_runtime_current_version" Root="HKLM" Key="Software\JavaSoft\JDK">
        <RegistryValue Name="Other" Value="PLACEHOLDER_VERSION_NUMBER"/>
        <RegistryValue Name="CurrentVersion" Value="PLACEHOLDER_VERSION_NUMBER"/>
      </RegistryKey>
    </Component>
    <Directory Id="TARGETDIR" Name="SourceDir">
      <Directory Id="ProgramFiles64Folder">
        <Directory Id="dir_vendor" Name="Vendor">
          <Directory Id="INSTALLDIR" Name="vendor-PLACEHOLDER_VERSION_FEATURE"/>
        </Directory>
      </Directory>
    </Directory>
  </Product>
</Wix>
"#;

    fn versions() -> Versions {
        Versions::new("21", "21.0.2", "21.0.2.0")
    }

    #[test]
    fn replaces_all_four_positions() {
        let mut doc = Document::parse(DESCRIPTOR).expect("well-formed");
        let report = stamp_document(&mut doc, &versions()).expect("stamped");
        assert_eq!(report.total(), 5);

        let xml = doc.to_xml_string().expect("serializable");
        assert!(!xml.starts_with("<?xml"));
        assert!(xml.contains(r#"Name="app-21.0.2""#));
        assert!(xml.contains(r#"Version="21.0.2.0""#));
        assert!(xml.contains(r#"<RegistryValue Name="CurrentVersion" Value="21.0.2"/>"#));
        assert!(xml.contains(r#"Key="Software\JavaSoft\JDK\21.0.2""#));
        assert!(xml.contains(r#"Name="vendor-21""#));
        // Only the CurrentVersion value is a stamping target.
        assert!(xml.contains(r#"<RegistryValue Name="Other" Value="PLACEHOLDER_VERSION_NUMBER"/>"#));
    }

    #[test]
    fn second_run_replaces_nothing() {
        let mut doc = Document::parse(DESCRIPTOR).expect("well-formed");
        stamp_document(&mut doc, &versions()).expect("stamped");
        let once = doc.clone();
        let report = stamp_document(&mut doc, &versions()).expect("stamped again");
        assert_eq!(report, StampReport::default());
        assert_eq!(doc, once);
    }

    #[test]
    fn product_version_uses_four_position_token_only() {
        let source = DESCRIPTOR.replace(
            r#"Version="PLACEHOLDER_VERSION_NUMBER_FOUR_POSITIONS""#,
            r#"Version="PLACEHOLDER_VERSION_NUMBER""#,
        );
        let mut doc = Document::parse(&source).expect("well-formed");
        let report = stamp_document(&mut doc, &versions()).expect("stamped");
        assert_eq!(report.product_version, 0);
        let product = doc.root().child_elements().next().expect("Product");
        assert_eq!(product.attribute("Version"), Some("PLACEHOLDER_VERSION_NUMBER"));
    }

    #[test]
    fn missing_vendor_dir_is_structure_error() {
        let source = DESCRIPTOR.replace(r#"Id="dir_vendor""#, r#"Id="dir_other""#);
        let mut doc = Document::parse(&source).expect("well-formed");
        let err = stamp_document(&mut doc, &versions()).unwrap_err();
        match err {
            StampError::Structure(structure) => {
                assert_eq!(structure.key(), "dir_vendor");
                assert_eq!(structure.to_string(), "Child node not found, id: [dir_vendor]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_product_is_structure_error() {
        let mut doc = Document::parse("<Wix><Fragment/></Wix>").expect("well-formed");
        let err = stamp_document(&mut doc, &versions()).unwrap_err();
        assert!(matches!(err, StampError::Structure(StructureError::ProductNotFound)));

        let mut doc = Document::parse("<Other><Product/></Other>").expect("well-formed");
        let err = stamp_document(&mut doc, &versions()).unwrap_err();
        assert!(matches!(err, StampError::Structure(StructureError::ProductNotFound)));
    }

    #[test]
    fn product_is_not_searched_deeply() {
        let mut doc = Document::parse("<Wix><Module><Product/></Module></Wix>").expect("well-formed");
        assert!(stamp_document(&mut doc, &versions()).is_err());
    }

    #[test]
    fn missing_current_version_value_is_structure_error() {
        let source = DESCRIPTOR.replace(r#"Name="CurrentVersion""#, r#"Name="Previous""#);
        let mut doc = Document::parse(&source).expect("well-formed");
        let err = stamp_document(&mut doc, &versions()).unwrap_err();
        match err {
            StampError::Structure(structure) => assert_eq!(structure.key(), "CurrentVersion"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_java_home_key_is_structure_error() {
        let source = DESCRIPTOR.replace(r#"Id="registry_runtime_java_home""#, r#"Id="registry_other""#);
        let mut doc = Document::parse(&source).expect("well-formed");
        let err = stamp_document(&mut doc, &versions()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Child node not found, id: [registry_runtime_java_home]"
        );
    }

    #[test]
    fn tokens_absent_leave_values_unchanged() {
        let source = DESCRIPTOR.replace("vendor-PLACEHOLDER_VERSION_FEATURE", "vendor-fixed");
        let mut doc = Document::parse(&source).expect("well-formed");
        let report = stamp_document(&mut doc, &versions()).expect("stamped");
        assert_eq!(report.install_dir_name, 0);
        assert!(doc.to_xml_string().expect("serializable").contains(r#"Name="vendor-fixed""#));
    }

    #[tokio::test]
    async fn stamp_writes_output_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("jdk.xml");
        let dest = dir.path().join("jdk.wxs");
        tokio::fs::write(&src, DESCRIPTOR).await.expect("write input");

        let report = stamp(&src, &dest, &versions()).await.expect("stamped");
        assert_eq!(report.total(), 5);
        let written = tokio::fs::read_to_string(&dest).await.expect("output");
        assert!(written.starts_with("<Wix"));
        assert!(written.contains(r#"Name="vendor-21""#));
    }

    #[tokio::test]
    async fn stamp_fails_fast_on_missing_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("absent.xml");
        let dest = dir.path().join("out.xml");
        let err = stamp(&src, &dest, &versions()).await.unwrap_err();
        assert!(matches!(err, StampError::InputNotFound { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn stamp_writes_nothing_on_structure_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("jdk.xml");
        let dest = dir.path().join("jdk.wxs");
        let source = DESCRIPTOR.replace(r#"Id="dir_vendor""#, r#"Id="dir_other""#);
        tokio::fs::write(&src, source).await.expect("write input");

        let err = stamp(&src, &dest, &versions()).await.unwrap_err();
        assert!(matches!(err, StampError::Structure(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn stamp_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("broken.xml");
        tokio::fs::write(&src, "<Wix><Product></Wix>").await.expect("write input");

        let err = stamp(&src, &dir.path().join("out.xml"), &versions()).await.unwrap_err();
        assert!(matches!(err, StampError::Parse { .. }));
    }

    #[tokio::test]
    async fn stamp_reports_unwritable_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("jdk.xml");
        let dest = dir.path().join("missing").join("out.xml");
        tokio::fs::write(&src, DESCRIPTOR).await.expect("write input");

        let err = stamp(&src, &dest, &versions()).await.unwrap_err();
        match &err {
            StampError::Write { path, .. } => assert_eq!(path, &dest),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("failed to write descriptor"), "{err}");
        assert!(!dir.path().join("missing").exists());
    }
}
