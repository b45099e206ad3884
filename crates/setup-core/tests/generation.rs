use setup_core::catalog::Catalog;
use setup_core::error::{Diagnostic, GenerationError};
use setup_core::project::ProjectGenerator;
use setup_core::selection::{PlatformId, SelectionModel};
use setup_core::templates::{FileBlueprint, Template, TemplateCatalog};
use setup_core::version::{resolve_extremum, Extremum};
use setup_core::writer::{write_project, MemoryWriter};
use setup_core::TemplateSource;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

const CATALOG: &str = r#"
framework_version: "1.9.10"
gwt_versions: ["2.8.2"]
defaults:
  android_sdk_version: "29"
  android_tools_version: "29.0.2"
platforms:
  - id: desktop
  - id: android
    min_dialect_versions:
      kotlin: "1.3"
  - id: html
dialects:
  - id: java
    name: Java
    versions: ["1.8"]
  - id: kotlin
    name: Kotlin
    versions: ["1.1", "1.3"]
    stdlib: org.jetbrains.kotlin:kotlin-stdlib
extensions:
  - id: box2d
    name: Box2D
    url: https://github.com/libgdx/libgdx/wiki/Box2d
    category: official
    platforms: all
    artifact: com.badlogicgames.gdx:gdx-box2d
    modules:
      desktop:
        artifact: com.badlogicgames.gdx:gdx-box2d-platform:natives-desktop
  - id: gwt-only-ext
    name: GWT only
    url: https://example.com/gwt-only-ext
    category: third-party
    default_version: "0.3.0"
    platforms: [html]
    artifact: com.example:gwt-only-ext
"#;

fn blueprint(path: &str, content: &str) -> FileBlueprint {
    FileBlueprint {
        path: path.to_string(),
        content: content.to_string(),
    }
}

fn templates() -> TemplateCatalog {
    let mut blueprints = BTreeMap::new();
    blueprints.insert(
        "core".to_string(),
        vec![blueprint(
            "src/%PACKAGE_PATH%/%MAIN_CLASS%.java",
            "package %PACKAGE%;\n// gdx %GDX_VERSION%\n",
        )],
    );
    blueprints.insert(
        "desktop".to_string(),
        vec![blueprint("src/DesktopLauncher.java", "new %MAIN_CLASS%();\n")],
    );
    blueprints.insert(
        "android".to_string(),
        vec![blueprint("AndroidManifest.xml", "<manifest package=\"%PACKAGE%\"/>\n")],
    );

    let mut catalog = TemplateCatalog::default();
    catalog.insert(Template {
        id: "basic".to_string(),
        name: "Basic".to_string(),
        description: "core, desktop and android blueprints".to_string(),
        version: None,
        blueprints,
    });
    catalog
}

fn generator() -> ProjectGenerator {
    ProjectGenerator::new(
        Arc::new(Catalog::from_yaml(CATALOG).unwrap()),
        Arc::new(templates()),
        "0.1.0",
    )
}

fn desktop_with(extension: &str) -> SelectionModel {
    SelectionModel::builder("demo")
        .package_name("com.example.demo")
        .platform(PlatformId::Desktop)
        .extension(extension)
        .build()
        .unwrap()
}

#[test]
fn desktop_with_universal_extension_gets_dependencies_in_both_modules() {
    let generated = generator().generate(&desktop_with("box2d")).unwrap();
    let project = &generated.project;

    assert_eq!(
        project.modules.keys().collect::<Vec<_>>(),
        vec!["core", "desktop"]
    );

    let core: Vec<String> = project.modules["core"]
        .dependencies
        .iter()
        .map(|d| d.notation())
        .collect();
    assert_eq!(core, vec!["com.badlogicgames.gdx:gdx-box2d:1.9.10"]);

    let desktop: Vec<String> = project.modules["desktop"]
        .dependencies
        .iter()
        .map(|d| d.notation())
        .collect();
    assert_eq!(
        desktop,
        vec!["com.badlogicgames.gdx:gdx-box2d-platform:1.9.10:natives-desktop"]
    );
    assert!(generated
        .diagnostics
        .iter()
        .all(|d| matches!(d, Diagnostic::MissingModuleBlueprint { .. })));
}

#[test]
fn android_rejects_dialect_below_platform_minimum() {
    let selection = SelectionModel::builder("demo")
        .platform(PlatformId::Android)
        .dialect("kotlin", "1.1")
        .build()
        .unwrap();

    let err = generator().generate(&selection).unwrap_err();
    assert_eq!(
        err,
        GenerationError::IncompatibleDialectVersion {
            platform: "android".to_string(),
            dialect: "kotlin".to_string(),
            required: "1.3".to_string(),
            selected: "1.1".to_string(),
        }
    );
}

#[test]
fn extension_without_selected_platform_is_dropped_with_warning() {
    let generated = generator().generate(&desktop_with("gwt-only-ext")).unwrap();

    assert!(generated
        .project
        .modules
        .values()
        .all(|m| m.dependencies.is_empty()));
    assert!(generated.diagnostics.contains(&Diagnostic::NoApplicablePlatform {
        extension: "gwt-only-ext".to_string(),
    }));
}

#[test]
fn blueprints_for_unselected_modules_are_skipped() {
    let selection = SelectionModel::builder("demo")
        .package_name("com.example.demo")
        .main_class("Demo")
        .platform(PlatformId::Desktop)
        .template("basic")
        .build()
        .unwrap();

    let generated = generator().generate(&selection).unwrap();
    let project = &generated.project;

    assert_eq!(
        project.modules["core"].files["src/com/example/demo/Demo.java"],
        "package com.example.demo;\n// gdx 1.9.10\n"
    );
    assert_eq!(
        project.modules["desktop"].files["src/DesktopLauncher.java"],
        "new Demo();\n"
    );
    assert!(!project.modules.contains_key("android"));
    assert_eq!(
        generated.diagnostics,
        vec![Diagnostic::MissingModuleBlueprint {
            template: "basic".to_string(),
            module: "android".to_string(),
        }]
    );
}

#[test]
fn generation_is_deterministic() {
    let selection = SelectionModel::builder("demo")
        .platforms([PlatformId::Html, PlatformId::Desktop, PlatformId::Android])
        .dialect("kotlin", "1.3")
        .extensions(["gwt-only-ext", "box2d"])
        .build()
        .unwrap();
    let generator = generator();

    let first = generator.generate(&selection).unwrap();
    let second = generator.generate(&selection).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.project.to_yaml().unwrap(),
        second.project.to_yaml().unwrap()
    );

    // Dialect stdlib comes first, then extensions in selection order
    let core: Vec<&str> = first.project.modules["core"]
        .dependencies
        .iter()
        .map(|d| d.extension.as_str())
        .collect();
    assert_eq!(core, vec!["kotlin", "gwt-only-ext", "box2d"]);
}

#[test]
fn partially_supported_extension_is_reported() {
    let selection = SelectionModel::builder("demo")
        .platforms([PlatformId::Desktop, PlatformId::Html])
        .extension("gwt-only-ext")
        .build()
        .unwrap();

    let generated = generator().generate(&selection).unwrap();
    assert!(generated.diagnostics.contains(&Diagnostic::PartiallyApplicable {
        extension: "gwt-only-ext".to_string(),
        unsupported: vec!["desktop".to_string()],
    }));
    assert!(generated.project.modules["desktop"].dependencies.is_empty());
    assert_eq!(generated.project.modules["html"].dependencies.len(), 1);
    assert_eq!(generated.project.modules["core"].dependencies.len(), 1);
}

#[test]
fn extremum_ignores_input_order() {
    let forward = ["27", "28.0.3", "26.1", "28.0.3-rc1", "27.0.0"];
    let mut backward = forward;
    backward.reverse();

    for which in [Extremum::Latest, Extremum::Oldest] {
        assert_eq!(
            resolve_extremum("tools", &forward, which).unwrap(),
            resolve_extremum("tools", &backward, which).unwrap()
        );
    }
    assert_eq!(
        *resolve_extremum("tools", &forward, Extremum::Latest).unwrap(),
        "28.0.3"
    );
    assert_eq!(
        *resolve_extremum("tools", &forward, Extremum::Oldest).unwrap(),
        "26.1"
    );
}

#[test]
fn generator_is_shareable_across_threads() {
    let generator = generator();
    let selection = desktop_with("box2d");
    let expected = generator.generate(&selection).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let generator = generator.clone();
            let selection = selection.clone();
            std::thread::spawn(move || generator.generate(&selection).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[tokio::test]
async fn written_project_contains_build_files() {
    let selection = desktop_with("box2d");
    let generated = generator().generate(&selection).unwrap();

    let mut writer = MemoryWriter::default();
    write_project(&mut writer, &generated.project, &selection)
        .await
        .unwrap();

    let settings = &writer.files[&PathBuf::from("settings.gradle")];
    assert_eq!(settings, "include 'core', 'desktop'\n");
    let properties = &writer.files[&PathBuf::from("gradle.properties")];
    assert!(properties.contains("gdxVersion=1.9.10\n"));
    assert!(properties.contains("appName=demo\n"));
    let desktop = &writer.files[&PathBuf::from("desktop/build.gradle")];
    assert!(desktop.contains("gdx-box2d-platform:1.9.10:natives-desktop"));
}

const SHARED_MODULE_CATALOG: &str = r#"
framework_version: "1.9.10"
defaults:
  android_sdk_version: "29"
  android_tools_version: "29.0.2"
platforms:
  - id: desktop
  - id: headless
    module: desktop
dialects:
  - id: java
    name: Java
    versions: ["1.8"]
extensions:
  - id: box2d
    name: Box2D
    url: https://github.com/libgdx/libgdx/wiki/Box2d
    category: official
    platforms: all
    artifact: com.badlogicgames.gdx:gdx-box2d
    modules:
      desktop:
        artifact: com.badlogicgames.gdx:gdx-box2d-platform:natives-desktop
  - id: ai
    name: AI
    url: https://github.com/libgdx/gdx-ai
    category: official
    default_version: "1.8.2"
    platforms: [headless]
    artifact: com.badlogicgames.gdx:gdx-ai
"#;

#[test]
fn platforms_sharing_a_module_get_one_dependency_per_extension() {
    let generator = ProjectGenerator::new(
        Arc::new(Catalog::from_yaml(SHARED_MODULE_CATALOG).unwrap()),
        Arc::new(templates()),
        "0.1.0",
    );
    let selection = SelectionModel::builder("demo")
        .platforms([PlatformId::Desktop, PlatformId::Headless])
        .extensions(["box2d", "ai"])
        .build()
        .unwrap();

    let generated = generator.generate(&selection).unwrap();
    let project = &generated.project;
    assert_eq!(
        project.modules.keys().collect::<Vec<_>>(),
        vec!["core", "desktop"]
    );

    for (name, module) in &project.modules {
        for extension in ["box2d", "ai"] {
            let count = module
                .dependencies
                .iter()
                .filter(|d| d.extension == extension && d.module == *name)
                .count();
            assert_eq!(count, 1, "{} in {}", extension, name);
        }
    }
    // ai only runs on headless, which the shared module serves
    assert!(generated.diagnostics.contains(&Diagnostic::PartiallyApplicable {
        extension: "ai".to_string(),
        unsupported: vec!["desktop".to_string()],
    }));
}

#[test]
fn blueprints_cannot_escape_their_module() {
    for path in ["../android/Evil.java", "/tmp/abs.txt"] {
        let mut templates = templates();
        templates.insert(Template {
            id: "escape".to_string(),
            name: "Escape".to_string(),
            description: "writes outside core".to_string(),
            version: None,
            blueprints: BTreeMap::from([(
                "core".to_string(),
                vec![blueprint(path, "evil\n")],
            )]),
        });
        let generator = ProjectGenerator::new(
            Arc::new(Catalog::from_yaml(CATALOG).unwrap()),
            Arc::new(templates),
            "0.1.0",
        );
        let selection = SelectionModel::builder("demo")
            .platform(PlatformId::Desktop)
            .template("escape")
            .build()
            .unwrap();

        assert_eq!(
            generator.generate(&selection).unwrap_err(),
            GenerationError::PathOutsideModule {
                template: "escape".to_string(),
                module: "core".to_string(),
                path: path.to_string(),
            }
        );
    }
}

#[test]
fn extension_version_property_is_a_groovy_identifier() {
    let selection = SelectionModel::builder("demo")
        .platform(PlatformId::Html)
        .extension("gwt-only-ext")
        .extension_version("gwt-only-ext", "0.4.0")
        .build()
        .unwrap();

    let project = generator().generate(&selection).unwrap().project;
    assert_eq!(project.properties["gwtOnlyExtVersion"], "0.4.0");
    assert!(!project.properties.contains_key("gwt-only-extVersion"));
}

#[tokio::test]
async fn builtin_desktop_project_is_buildable() {
    let generator = ProjectGenerator::new(
        Arc::new(Catalog::builtin().unwrap()),
        Arc::new(TemplateSource::Builtin.load().unwrap()),
        "0.1.0",
    );
    let selection = SelectionModel::builder("demo")
        .package_name("com.example.demo")
        .platform(PlatformId::Desktop)
        .build()
        .unwrap();
    let generated = generator.generate(&selection).unwrap();

    let mut writer = MemoryWriter::default();
    write_project(&mut writer, &generated.project, &selection)
        .await
        .unwrap();
    let file = |path: &str| writer.files[&PathBuf::from(path)].as_str();

    let core = file("core/build.gradle");
    assert!(core.contains("api \"com.badlogicgames.gdx:gdx:1.9.10\""));

    let desktop = file("desktop/build.gradle");
    assert!(desktop.contains("apply plugin: 'application'"));
    assert!(desktop.contains("implementation project(':core')"));
    assert!(desktop.contains("\"com.badlogicgames.gdx:gdx-backend-lwjgl3:1.9.10\""));
    assert!(desktop.contains("\"com.badlogicgames.gdx:gdx-platform:1.9.10:natives-desktop\""));
    assert!(desktop.contains("mainClassName = 'com.example.demo.lwjgl3.Lwjgl3Launcher'"));

    let root = file("build.gradle");
    assert!(root.contains("mavenCentral()"));
    assert!(root.contains("allprojects {"));

    // Every written file lives under a selected module or at the project root
    for path in writer.files.keys() {
        let first = path.components().next().unwrap();
        let first = first.as_os_str().to_str().unwrap();
        assert!(
            path.components().count() == 1 || ["core", "desktop"].contains(&first),
            "{}",
            path.display()
        );
    }
}
