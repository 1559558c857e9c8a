/**
 * XLIFF 1.2 Codec Tests
 *
 * Write-side serialization, read-side parsing, and the per-target-locale
 * file layout of the XLIFF interchange format.
 */

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use localize_compiler::formats::{Formatter, XliffFormatter};
    use localize_compiler::{Content, Error, Locale, ProgramMessage};

    fn locale(code: &str) -> Locale {
        Locale::new(code).unwrap()
    }

    fn formatter(targets: &[&str], dir: PathBuf) -> XliffFormatter {
        XliffFormatter::new(
            locale("en"),
            targets.iter().map(|t| locale(t)).collect(),
            dir,
        )
    }

    fn in_memory_formatter(targets: &[&str]) -> XliffFormatter {
        formatter(targets, PathBuf::from("unused"))
    }

    fn rich_greeting() -> ProgramMessage {
        ProgramMessage {
            name: "hdeadbeef".to_string(),
            contents: vec![
                Content::text("Hello "),
                Content::placeholder("${name}"),
                Content::text("!"),
            ],
            is_rich: true,
            desc_stack: vec!["login page".to_string(), "banner".to_string()],
        }
    }

    #[test]
    fn serializes_the_documented_layout() {
        let document =
            in_memory_formatter(&["es"]).serialize_source_messages(&locale("es"), &[rich_greeting()]);
        assert_eq!(
            document,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <xliff version=\"1.2\" xmlns=\"urn:oasis:names:tc:xliff:document:1.2\">\n  \
             <file target-language=\"es\" source-language=\"en\" \
             original=\"localize-compiler\" datatype=\"plaintext\">\n    \
             <body>\n      \
             <trans-unit id=\"hdeadbeef\">\n        \
             <note>login page / banner</note>\n        \
             <source>Hello <ph id=\"0\">${name}</ph>!</source>\n      \
             </trans-unit>\n    \
             </body>\n  \
             </file>\n\
             </xliff>"
        );
    }

    #[test]
    fn placeholder_ids_count_up_per_unit() {
        let message = ProgramMessage {
            name: "h2".to_string(),
            contents: vec![
                Content::placeholder("<b>"),
                Content::text("hi"),
                Content::placeholder("</b>"),
            ],
            is_rich: true,
            desc_stack: Vec::new(),
        };
        let document = in_memory_formatter(&["es"])
            .serialize_source_messages(&locale("es"), &[message.clone(), message]);
        // Ids restart at 0 in the second unit.
        assert_eq!(document.matches("<ph id=\"0\">").count(), 2);
        assert_eq!(document.matches("<ph id=\"1\">").count(), 2);
    }

    #[test]
    fn units_without_a_note_omit_the_note_element() {
        let message = ProgramMessage {
            name: "s1".to_string(),
            contents: vec![Content::text("Hello")],
            is_rich: false,
            desc_stack: Vec::new(),
        };
        let document =
            in_memory_formatter(&["es"]).serialize_source_messages(&locale("es"), &[message]);
        assert!(!document.contains("<note>"));
    }

    fn translated_document() -> &'static str {
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <xliff version=\"1.2\" xmlns=\"urn:oasis:names:tc:xliff:document:1.2\">\n\
           <file target-language=\"es\" source-language=\"en\" \
                 original=\"localize-compiler\" datatype=\"plaintext\">\n\
             <body>\n\
               <trans-unit id=\"hdeadbeef\">\n\
                 <note>login page</note>\n\
                 <source>Hello <ph id=\"0\">${name}</ph>!</source>\n\
                 <target>\u{00A1}Hola <ph id=\"0\">${name}</ph>!</target>\n\
               </trans-unit>\n\
               <trans-unit id=\"s2\">\n\
                 <source>World</source>\n\
               </trans-unit>\n\
             </body>\n\
           </file>\n\
         </xliff>"
    }

    #[test]
    fn parses_targets_and_skips_untranslated_units() {
        let bundle = in_memory_formatter(&["es"])
            .parse_bundle(translated_document(), Path::new("es.xlf"))
            .unwrap();
        assert_eq!(bundle.locale.as_str(), "es");
        // The unit without a <target> is simply not translated yet.
        assert_eq!(bundle.messages.len(), 1);
        assert_eq!(bundle.messages[0].name, "hdeadbeef");
        assert_eq!(
            bundle.messages[0].contents,
            vec![
                Content::text("\u{00A1}Hola "),
                Content::placeholder("${name}"),
                Content::text("!"),
            ]
        );
    }

    #[test]
    fn round_trips_a_hand_translated_document() {
        let codec = in_memory_formatter(&["es"]);
        let source = rich_greeting();
        let document = codec.serialize_source_messages(&locale("es"), &[source]);
        // The translator writes a <target> by copying the <source>; inserting
        // one right before </trans-unit> mirrors what CAT tools produce.
        let translated = document.replace(
            "</source>",
            "</source>\n        <target>Hola <ph id=\"0\">${name}</ph>, mundo</target>",
        );
        let bundle = codec.parse_bundle(&translated, Path::new("es.xlf")).unwrap();
        assert_eq!(bundle.messages.len(), 1);
        assert_eq!(
            bundle.messages[0].contents,
            vec![
                Content::text("Hola "),
                Content::placeholder("${name}"),
                Content::text(", mundo"),
            ]
        );
    }

    #[test]
    fn two_targets_in_one_unit_are_fatal() {
        let document = translated_document().replace(
            "<target>\u{00A1}Hola <ph id=\"0\">${name}</ph>!</target>",
            "<target>Hola</target>\n<target>otra vez</target>",
        );
        let result = in_memory_formatter(&["es"]).parse_bundle(&document, Path::new("es.xlf"));
        assert!(
            matches!(result, Err(Error::CorruptTranslationFile { ref message, .. }) if message.contains("target"))
        );
    }

    #[test]
    fn missing_target_language_is_fatal() {
        let document = "<xliff version=\"1.2\"><file source-language=\"en\">\
             <body/></file></xliff>";
        let result = in_memory_formatter(&["es"]).parse_bundle(document, Path::new("es.xlf"));
        assert!(
            matches!(result, Err(Error::CorruptTranslationFile { ref message, .. }) if message.contains("target-language"))
        );
    }

    #[test]
    fn missing_body_is_fatal() {
        let document = "<xliff version=\"1.2\"><file target-language=\"es\"/></xliff>";
        let result = in_memory_formatter(&["es"]).parse_bundle(document, Path::new("es.xlf"));
        assert!(matches!(result, Err(Error::CorruptTranslationFile { .. })));
    }

    #[test]
    fn unit_without_an_id_is_fatal() {
        let document = "<xliff version=\"1.2\"><file target-language=\"es\"><body>\
             <trans-unit><target>Hola</target></trans-unit></body></file></xliff>";
        let result = in_memory_formatter(&["es"]).parse_bundle(document, Path::new("es.xlf"));
        assert!(
            matches!(result, Err(Error::CorruptTranslationFile { ref message, .. }) if message.contains("id"))
        );
    }

    #[test]
    fn write_output_emits_one_file_per_target_locale() {
        let dir = tempfile::tempdir().unwrap();
        let codec = formatter(&["es", "zh-Hans"], dir.path().join("xliff"));
        codec.write_output(&[rich_greeting()]).unwrap();
        let es = fs::read_to_string(dir.path().join("xliff").join("es.xlf")).unwrap();
        let zh = fs::read_to_string(dir.path().join("xliff").join("zh-Hans.xlf")).unwrap();
        assert!(es.contains("target-language=\"es\""));
        assert!(zh.contains("target-language=\"zh-Hans\""));
        // Writes carry only the source content; translators add targets.
        assert!(!es.contains("<target>"));
    }

    #[test]
    fn a_failing_locale_write_does_not_block_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let xliff_dir = dir.path().join("xliff");
        // A directory squatting on the es path makes that write fail.
        fs::create_dir_all(xliff_dir.join("es.xlf")).unwrap();
        let codec = formatter(&["es", "fr"], xliff_dir.clone());
        let result = codec.write_output(&[rich_greeting()]);
        assert!(matches!(result, Err(Error::Write { .. })));
        // The fr file was still written in full.
        let fr = fs::read_to_string(xliff_dir.join("fr.xlf")).unwrap();
        assert!(fr.contains("target-language=\"fr\""));
        assert!(fr.ends_with("</xliff>"));
    }

    #[test]
    fn read_bundles_skips_locales_with_no_file_yet() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("es.xlf"), translated_document()).unwrap();
        let codec = formatter(&["es", "fr"], dir.path().to_path_buf());
        let bundles = codec.read_bundles().unwrap();
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].locale.as_str(), "es");
    }

    #[test]
    fn a_corrupt_file_fails_the_whole_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("es.xlf"), "<xliff version=\"1.2\">").unwrap();
        let codec = formatter(&["es"], dir.path().to_path_buf());
        assert!(codec.read_bundles().is_err());
    }
}
