use proptest::prelude::*;
use setup_core::catalog::Catalog;
use setup_core::project::ProjectGenerator;
use setup_core::selection::{PlatformId, SelectionModel};
use setup_core::templates::TemplateCatalog;
use setup_core::version::{compare_versions, resolve_extremum, Extremum};
use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

fn generator() -> &'static ProjectGenerator {
    static GENERATOR: OnceLock<ProjectGenerator> = OnceLock::new();
    GENERATOR.get_or_init(|| {
        ProjectGenerator::new(
            Arc::new(Catalog::builtin().unwrap()),
            Arc::new(TemplateCatalog::builtin()),
            "0.1.0",
        )
    })
}

/// Versions as catalogs list them: two or three numeric parts, sometimes a pre-release tag
fn arb_version() -> impl Strategy<Value = String> {
    (
        0u8..4,
        0u8..12,
        0u8..4,
        any::<bool>(),
        prop::option::of("(alpha|beta|rc)[0-9]"),
    )
        .prop_map(|(major, minor, patch, short, pre)| {
            let mut version = if short && patch == 0 {
                format!("{major}.{minor}")
            } else {
                format!("{major}.{minor}.{patch}")
            };
            if let Some(pre) = pre {
                version.push('-');
                version.push_str(&pre);
            }
            version
        })
}

fn arb_selection() -> impl Strategy<Value = SelectionModel> {
    let extension_ids: Vec<String> = generator()
        .catalog()
        .extensions()
        .iter()
        .map(|extension| extension.id.clone())
        .collect();
    let extension_count = extension_ids.len();

    (
        prop::sample::subsequence(PlatformId::ALL.to_vec(), 1..=PlatformId::ALL.len()),
        prop::sample::subsequence(extension_ids, 0..=extension_count).prop_shuffle(),
        prop::sample::select(vec!["basic", "application-listener"]),
    )
        .prop_map(|(platforms, extensions, template)| {
            SelectionModel::builder("demo")
                .package_name("com.example.demo")
                .platforms(platforms)
                .extensions(extensions)
                .template(template)
                .build()
                .unwrap()
        })
}

proptest! {
    #[test]
    fn extremum_is_independent_of_order(
        (versions, shuffled) in prop::collection::vec(arb_version(), 1..16)
            .prop_flat_map(|versions| (Just(versions.clone()), Just(versions).prop_shuffle()))
    ) {
        for (which, beaten) in [
            (Extremum::Latest, Ordering::Greater),
            (Extremum::Oldest, Ordering::Less),
        ] {
            let picked = resolve_extremum("versions", &versions, which).unwrap();
            prop_assert_eq!(picked, resolve_extremum("versions", &shuffled, which).unwrap());

            for other in &versions {
                let ordering = compare_versions(picked, other).unwrap();
                prop_assert!(
                    ordering == Ordering::Equal || ordering == beaten,
                    "{} does not beat {} for {:?}",
                    picked,
                    other,
                    which
                );
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generation_is_repeatable(selection in arb_selection()) {
        let first = generator().generate(&selection);
        let second = generator().generate(&selection);
        prop_assert_eq!(&first, &second);

        let first = first.unwrap();
        let second = second.unwrap();
        prop_assert_eq!(
            first.project.to_yaml().unwrap(),
            second.project.to_yaml().unwrap()
        );
    }
}
