//! Embedded templates for the dataset skeleton.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "../../assets/scaffold/"]
pub struct Templates;
impl Templates {
    /// Loads an embedded template as text.
    pub fn load(name: &str) -> Result<String> {
        let file = Self::get(name).ok_or_raise(|| ErrorKind::Template(name.to_string()))?;
        String::from_utf8(file.data.into_owned()).or_raise(|| ErrorKind::Template(name.to_string()))
    }

    /// Renders an embedded template with `upon`.
    pub fn render(name: &str, context: upon::Value) -> Result<String> {
        let source = Self::load(name)?;
        let engine = upon::Engine::new();
        let template = engine.compile(source.as_str()).or_raise(|| ErrorKind::Template(name.to_string()))?;
        template.render(&engine, context).to_string().or_raise(|| ErrorKind::Template(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("README")]
    #[case("CHANGES")]
    #[case("participants.json")]
    #[case("participants.tsv")]
    fn test_load(#[case] name: &str) {
        assert!(!Templates::load(name).unwrap().is_empty());
    }

    #[test]
    fn test_missing() {
        assert!(Templates::load("nope").is_err());
    }

    #[test]
    fn test_render() {
        let readme = Templates::render("README", upon::value! { name: "study" }).unwrap();
        assert!(readme.starts_with("# study\n"));
    }
}
