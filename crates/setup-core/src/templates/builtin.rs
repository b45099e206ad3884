//! Templates compiled into the binary

use super::{FileBlueprint, Template, TemplateCatalog};
use std::collections::BTreeMap;

const MAIN_PATH: &str = "src/main/java/%PACKAGE_PATH%/%MAIN_CLASS%.java";

const CLEAR_SCREEN_MAIN: &str = r#"package %PACKAGE%;

import com.badlogic.gdx.ApplicationAdapter;
import com.badlogic.gdx.utils.ScreenUtils;

/** {@link com.badlogic.gdx.ApplicationListener} implementation shared by all platforms. */
public class %MAIN_CLASS% extends ApplicationAdapter {
    @Override
    public void render() {
        ScreenUtils.clear(0.15f, 0.15f, 0.2f, 1f);
    }
}
"#;

const LISTENER_MAIN: &str = r#"package %PACKAGE%;

import com.badlogic.gdx.ApplicationListener;
import com.badlogic.gdx.Gdx;
import com.badlogic.gdx.utils.ScreenUtils;

/** {@link ApplicationListener} implementation shared by all platforms. */
public class %MAIN_CLASS% implements ApplicationListener {
    @Override
    public void create() {
        Gdx.app.log("%PROJECT_NAME%", "Created");
    }

    @Override
    public void resize(int width, int height) {
    }

    @Override
    public void render() {
        ScreenUtils.clear(0f, 0f, 0f, 1f);
    }

    @Override
    public void pause() {
    }

    @Override
    public void resume() {
    }

    @Override
    public void dispose() {
    }
}
"#;

const DESKTOP_LAUNCHER: &str = r#"package %PACKAGE%.lwjgl3;

import com.badlogic.gdx.backends.lwjgl3.Lwjgl3Application;
import com.badlogic.gdx.backends.lwjgl3.Lwjgl3ApplicationConfiguration;
import %PACKAGE%.%MAIN_CLASS%;

/** Launches the desktop (LWJGL3) application. */
public class Lwjgl3Launcher {
    public static void main(String[] args) {
        Lwjgl3ApplicationConfiguration configuration = new Lwjgl3ApplicationConfiguration();
        configuration.setTitle("%PROJECT_NAME%");
        configuration.setWindowedMode(640, 480);
        configuration.useVsync(true);
        new Lwjgl3Application(new %MAIN_CLASS%(), configuration);
    }
}
"#;

const ANDROID_LAUNCHER: &str = r#"package %PACKAGE%.android;

import android.os.Bundle;
import com.badlogic.gdx.backends.android.AndroidApplication;
import com.badlogic.gdx.backends.android.AndroidApplicationConfiguration;
import %PACKAGE%.%MAIN_CLASS%;

/** Launches the Android application. */
public class AndroidLauncher extends AndroidApplication {
    @Override
    protected void onCreate(Bundle savedInstanceState) {
        super.onCreate(savedInstanceState);
        AndroidApplicationConfiguration configuration = new AndroidApplicationConfiguration();
        initialize(new %MAIN_CLASS%(), configuration);
    }
}
"#;

const ANDROID_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="%PACKAGE%">

    <uses-feature android:glEsVersion="0x00020000" android:required="true" />

    <application
        android:allowBackup="true"
        android:label="%PROJECT_NAME%">
        <activity
            android:name="%PACKAGE%.android.AndroidLauncher"
            android:label="%PROJECT_NAME%"
            android:screenOrientation="landscape"
            android:configChanges="keyboard|keyboardHidden|navigation|orientation|screenSize|screenLayout">
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
                <category android:name="android.intent.category.LAUNCHER" />
            </intent-filter>
        </activity>
    </application>
</manifest>
"#;

const IOS_LAUNCHER: &str = r#"package %PACKAGE%;

import org.robovm.apple.foundation.NSAutoreleasePool;
import org.robovm.apple.uikit.UIApplication;
import com.badlogic.gdx.backends.iosrobovm.IOSApplication;
import com.badlogic.gdx.backends.iosrobovm.IOSApplicationConfiguration;

/** Launches the iOS (RoboVM) application. */
public class IOSLauncher extends IOSApplication.Delegate {
    @Override
    protected IOSApplication createApplication() {
        IOSApplicationConfiguration configuration = new IOSApplicationConfiguration();
        return new IOSApplication(new %MAIN_CLASS%(), configuration);
    }

    public static void main(String[] argv) {
        NSAutoreleasePool pool = new NSAutoreleasePool();
        UIApplication.main(argv, null, IOSLauncher.class);
        pool.close();
    }
}
"#;

const GWT_LAUNCHER: &str = r#"package %PACKAGE%.gwt;

import com.badlogic.gdx.ApplicationListener;
import com.badlogic.gdx.backends.gwt.GwtApplication;
import com.badlogic.gdx.backends.gwt.GwtApplicationConfiguration;
import %PACKAGE%.%MAIN_CLASS%;

/** Launches the web application. */
public class GwtLauncher extends GwtApplication {
    @Override
    public GwtApplicationConfiguration getConfig() {
        return new GwtApplicationConfiguration(640, 480);
    }

    @Override
    public ApplicationListener createApplicationListener() {
        return new %MAIN_CLASS%();
    }
}
"#;

const GWT_DEFINITION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE module PUBLIC "-//Google Inc.//DTD Google Web Toolkit trunk//EN" "http://www.gwtproject.org/doctype/2.8.0/gwt-module.dtd">
<module rename-to="html">
    <inherits name="com.badlogic.gdx.backends.gdx_backends_gwt" />
    <inherits name="%MAIN_CLASS%" />
    <entry-point class="%PACKAGE%.gwt.GwtLauncher" />
</module>
"#;

const HEADLESS_LAUNCHER: &str = r#"package %PACKAGE%.headless;

import com.badlogic.gdx.backends.headless.HeadlessApplication;
import com.badlogic.gdx.backends.headless.HeadlessApplicationConfiguration;
import %PACKAGE%.%MAIN_CLASS%;

/** Launches the headless application. Can be converted into a utilities project or a server application. */
public class HeadlessLauncher {
    public static void main(String[] args) {
        HeadlessApplicationConfiguration configuration = new HeadlessApplicationConfiguration();
        configuration.updatesPerSecond = -1;
        new HeadlessApplication(new %MAIN_CLASS%(), configuration);
    }
}
"#;

const SERVER_LAUNCHER: &str = r#"package %PACKAGE%.server;

/** Launches the server application. */
public class ServerLauncher {
    public static void main(String[] args) {
        System.out.println("%PROJECT_NAME% server started");
    }
}
"#;

fn blueprint(path: &str, content: &str) -> FileBlueprint {
    FileBlueprint {
        path: path.to_string(),
        content: content.to_string(),
    }
}

/// Launcher blueprints shared by every built-in template
fn launchers() -> BTreeMap<String, Vec<FileBlueprint>> {
    let mut modules = BTreeMap::new();
    modules.insert(
        "desktop".to_string(),
        vec![blueprint(
            "src/main/java/%PACKAGE_PATH%/lwjgl3/Lwjgl3Launcher.java",
            DESKTOP_LAUNCHER,
        )],
    );
    modules.insert(
        "android".to_string(),
        vec![
            blueprint(
                "src/main/java/%PACKAGE_PATH%/android/AndroidLauncher.java",
                ANDROID_LAUNCHER,
            ),
            blueprint("src/main/AndroidManifest.xml", ANDROID_MANIFEST),
        ],
    );
    modules.insert(
        "ios".to_string(),
        vec![blueprint(
            "src/main/java/%PACKAGE_PATH%/IOSLauncher.java",
            IOS_LAUNCHER,
        )],
    );
    modules.insert(
        "html".to_string(),
        vec![
            blueprint(
                "src/main/java/%PACKAGE_PATH%/gwt/GwtLauncher.java",
                GWT_LAUNCHER,
            ),
            blueprint(
                "src/main/java/%PACKAGE_PATH%/GdxDefinition.gwt.xml",
                GWT_DEFINITION,
            ),
        ],
    );
    modules.insert(
        "headless".to_string(),
        vec![blueprint(
            "src/main/java/%PACKAGE_PATH%/headless/HeadlessLauncher.java",
            HEADLESS_LAUNCHER,
        )],
    );
    modules.insert(
        "server".to_string(),
        vec![blueprint(
            "src/main/java/%PACKAGE_PATH%/server/ServerLauncher.java",
            SERVER_LAUNCHER,
        )],
    );
    modules
}

fn template(id: &str, name: &str, description: &str, main: &str) -> Template {
    let mut blueprints = launchers();
    blueprints.insert("core".to_string(), vec![blueprint(MAIN_PATH, main)]);
    Template {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        version: None,
        blueprints,
    }
}

/// The built-in template catalog
pub fn templates() -> TemplateCatalog {
    let mut catalog = TemplateCatalog::default();
    catalog.insert(template(
        "basic",
        "Basic",
        "ApplicationAdapter that clears the screen every frame",
        CLEAR_SCREEN_MAIN,
    ));
    catalog.insert(template(
        "application-listener",
        "ApplicationListener",
        "Implements every ApplicationListener callback",
        LISTENER_MAIN,
    ));
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::Placeholders;

    #[test]
    fn test_builtin_ids() {
        let catalog = templates();
        assert_eq!(
            catalog.ids().collect::<Vec<_>>(),
            vec!["application-listener", "basic"]
        );
    }

    #[test]
    fn test_builtin_templates_only_use_known_tokens() {
        let mut placeholders = Placeholders::new();
        for token in ["PROJECT_NAME", "PACKAGE", "PACKAGE_PATH", "MAIN_CLASS"] {
            placeholders.insert(token, "x");
        }
        for template in templates().iter() {
            for blueprint in template.blueprints.values().flatten() {
                assert!(placeholders.substitute(&blueprint.path).is_ok());
                assert!(
                    placeholders.substitute(&blueprint.content).is_ok(),
                    "{} {}",
                    template.id,
                    blueprint.path
                );
            }
        }
    }

    #[test]
    fn test_every_platform_module_has_a_launcher() {
        let basic = templates().get("basic").cloned().unwrap();
        for module in ["core", "desktop", "android", "ios", "html", "headless", "server"] {
            assert!(basic.blueprints.contains_key(module), "{}", module);
        }
    }
}
