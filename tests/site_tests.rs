//! Site boot and render tests

mod common;

use common::*;
use serde_json::json;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hyperite::layout::LayoutModule;
use hyperite::{MenuProvider, ModuleError, Page, Site, SiteConfig, SiteError};

fn layout_fixture() -> SiteFixture {
    let fixture = SiteFixture::new().unwrap();
    fixture
        .template("default", "main.tpl", "<title>{title}</title>{menu}{main}")
        .template("default", "section.tpl", "<h1>{title}</h1><p>{content}</p>")
        .template("default", "item.tpl", "<li>{name}</li>");
    fixture
}

#[tokio::test]
async fn test_startup_hook_runs_once_before_modules() {
    let fixture = layout_fixture();
    let log = EventLog::default();
    let built = Arc::new(AtomicUsize::new(0));
    let mut resolver = hyperite::default_resolver();
    register_test_module(&mut resolver, "session", Behavior::Ok, &log, &built);

    let hook_log = log.clone();
    let site = Site::builder(fixture.config().with_priority_modules(["layout", "session"]))
        .resolver(resolver)
        .on_startup(move |config: &SiteConfig| {
            hook_log.push(format!("startup:{}", config.priority_modules.len()));
            Ok::<(), std::io::Error>(())
        })
        .boot()
        .await
        .unwrap();

    assert_eq!(log.events(), vec!["startup:2", "construct:session", "init:session"]);
    assert_eq!(site.registry().loaded_names(), vec!["layout", "session"]);
}

#[tokio::test]
async fn test_failing_startup_hook_aborts_boot() {
    let fixture = layout_fixture();
    let err = Site::builder(fixture.config().with_priority_modules(["layout"]))
        .on_startup(|_: &SiteConfig| Err("session store unreachable"))
        .boot()
        .await
        .unwrap_err();

    assert!(matches!(err, SiteError::Startup(_)));
    assert!(err.to_string().contains("session store unreachable"));
}

#[tokio::test]
async fn test_missing_priority_module_aborts_boot() {
    let fixture = layout_fixture();
    let err = Site::builder(fixture.config().with_priority_modules(["layout", "auth"]))
        .boot()
        .await
        .unwrap_err();

    match err {
        SiteError::Bootstrap(e) => {
            assert_eq!(e.module, "auth");
            assert_eq!(e.source, ModuleError::NotFound("auth".to_string()));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_render_through_site() {
    let fixture = layout_fixture();
    let site = Site::builder(fixture.config().with_priority_modules(["layout"]))
        .boot()
        .await
        .unwrap();

    let mut page = Page::new().title("Home");
    page.push_section("Welcome", "Hello");
    let html = site.render_page(page, None).unwrap();
    assert_eq!(html.as_str(), "<title>Home</title><h1>Welcome</h1><p>Hello</p>");

    let list = Page::new().content(json!([{"name": "tea"}, {"name": "milk"}]));
    let html = site.render_page(list, Some("item.tpl")).unwrap();
    assert_eq!(html.to_string(), "<title></title><li>tea</li><li>milk</li>");
}

#[tokio::test]
async fn test_layout_menu_provider_is_swappable() {
    let fixture = layout_fixture();
    let site = Site::builder(fixture.config().with_priority_modules(["layout"]))
        .boot()
        .await
        .unwrap();

    let menu: Arc<dyn MenuProvider> =
        Arc::new(|set: &hyperite::layout::TemplateSet| format!("<nav>{}</nav>", set.prefix()));
    site.registry()
        .context()
        .with_module(LayoutModule::NAME, |layout: &LayoutModule| {
            layout.set_menu_provider(menu)
        })
        .unwrap();

    let html = site.render_page(Page::new(), None).unwrap();
    assert_eq!(html.as_str(), "<title></title><nav>default/</nav>");
}

#[tokio::test]
async fn test_modules_reach_layout_through_context() {
    let fixture = layout_fixture();
    let log = EventLog::default();
    let built = Arc::new(AtomicUsize::new(0));
    let mut resolver = hyperite::default_resolver();
    register_test_module(&mut resolver, "blog", Behavior::Ok, &log, &built);

    let site = Site::builder(fixture.config().with_priority_modules(["layout"]))
        .resolver(resolver)
        .boot()
        .await
        .unwrap();
    assert!(site.load_module("blog").await);

    let blog = site.registry().lookup("blog").unwrap();
    let ctx = &blog.downcast_ref::<TestModule>().unwrap().context;
    let html = ctx
        .with_module(LayoutModule::NAME, |layout: &LayoutModule| {
            let mut page = layout.new_page();
            page.push_section("Post", "Body");
            layout.show(page, None)
        })
        .unwrap()
        .unwrap();
    assert_eq!(html.as_str(), "<title></title><h1>Post</h1><p>Body</p>");
}

#[tokio::test]
#[serial]
async fn test_env_overrides_priority_modules() {
    let fixture = layout_fixture();
    std::env::set_var("HYPERITE_PRIORITY_MODULES", "layout, ,");
    std::env::set_var("HYPERITE_INSTALL_ROOT", fixture.root());

    let mut config = SiteConfig::default();
    config.apply_env_overrides();

    std::env::remove_var("HYPERITE_PRIORITY_MODULES");
    std::env::remove_var("HYPERITE_INSTALL_ROOT");

    assert_eq!(config.priority_modules, vec!["layout"]);
    let site = Site::builder(config).boot().await.unwrap();
    assert!(site.registry().is_loaded("layout"));
}

#[tokio::test]
async fn test_config_file_round_trip_into_site() {
    let fixture = layout_fixture();
    let path = fixture.root().join("hyperite.toml");
    std::fs::write(
        &path,
        format!(
            "install_root = {:?}\ninstall_url = \"https://shop.test/\"\npriority_modules = \"layout\"\n\n[module_configs.layout]\ntemplate_set = \"print\"\n",
            fixture.root().display().to_string()
        ),
    )
    .unwrap();
    fixture
        .template("print", "main.tpl", "{http_url}|{main}")
        .template("print", "section.tpl", "{title}");

    let config = SiteConfig::from_file(&path).unwrap();
    let site = Site::builder(config).boot().await.unwrap();

    let mut page = Page::new();
    page.push_section("Receipt", "");
    let html = site.render_page(page, None).unwrap();
    assert_eq!(html.as_str(), "https://shop.test/|Receipt");
    assert_eq!(html.template_set(), "print");
}

#[tokio::test]
async fn test_built_counter_untouched_when_boot_fails_early() {
    let log = EventLog::default();
    let built = Arc::new(AtomicUsize::new(0));
    let mut resolver = hyperite::default_resolver();
    register_test_module(&mut resolver, "late", Behavior::Ok, &log, &built);

    let config = SiteConfig::default().with_priority_modules(["missing", "late"]);
    let result = Site::builder(config).resolver(resolver).boot().await;

    assert!(result.is_err());
    assert_eq!(built.load(Ordering::SeqCst), 0);
}
