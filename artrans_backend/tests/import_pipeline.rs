use artrans_backend::artran::decode_records;
use artrans_backend::bootstrap;
use artrans_backend::config::{ArtransConfig, ArtransPaths, ImportTarget};
use artrans_backend::console::AutoConfirm;
use artrans_backend::database::repositories::{
    CommentRepository, PageRepository, SiteRepository, UserRepository,
};
use artrans_backend::database::Database;
use artrans_backend::importer::{ArtransImporter, ImportOutcome, ImportReport};
use artrans_backend::progress::SilentReporter;
use tempfile::tempdir;

const THREAD: &str = r#"[
    {"id": "a", "rid": "", "content": "first", "nick": "Ann", "email": "ann@example.com",
     "page_key": "/posts/1", "page_title": "One", "site_name": "Blog",
     "site_urls": "https://blog.example.com", "created_at": "2020-01-02 03:04:05 +0000 UTC"},
    {"id": "b", "rid": "a", "content": "second", "nick": "Bob", "email": "bob@example.com",
     "page_key": "/posts/1", "page_title": "One", "site_name": "Blog",
     "site_urls": "https://blog.example.com", "created_at": "2020-01-03T00:00:00Z"}
]"#;

fn import(database: &Database, target: ImportTarget, json: &str) -> ImportReport {
    let records = decode_records(json.as_bytes()).expect("decode");
    let mut operator = AutoConfirm::new(Vec::new());
    let mut progress = SilentReporter;
    let mut importer = ArtransImporter::new(database, target, &mut operator, &mut progress);
    match importer.run(&records).expect("import runs") {
        ImportOutcome::Completed(report) => report,
        ImportOutcome::Aborted => panic!("auto-confirmed import aborted"),
    }
}

#[test]
fn reply_points_at_parent_after_reopen() {
    let temp = tempdir().expect("tempdir");
    let config = ArtransConfig::new(0, ArtransPaths::from_base_dir(temp.path()).expect("paths"));

    {
        let resources = bootstrap::initialize(&config).expect("bootstrap");
        assert!(resources.database_initialized);
        let report = import(&resources.database, ImportTarget::default(), THREAD);
        assert_eq!(report.total, 2);
        assert_eq!(report.imported, 2);
        assert!(report.skipped.is_empty());
    }

    let resources = bootstrap::initialize(&config).expect("reopen");
    assert!(!resources.database_initialized);
    resources
        .database
        .with_repositories(|repos| {
            let comments = repos.comments().list()?;
            assert_eq!(comments.len(), 2);
            let first = comments.iter().find(|c| c.content == "first").unwrap();
            let second = comments.iter().find(|c| c.content == "second").unwrap();
            assert_eq!(first.rid, 0);
            assert_eq!(second.rid, first.id);
            assert!(first.created_at.starts_with("2020-01-02T03:04:05"));
            assert_eq!(repos.sites().list()?.len(), 1);
            assert_eq!(repos.users().list()?.len(), 2);
            Ok(())
        })
        .expect("inspect");
}

#[test]
fn second_run_appends_comments_but_reuses_identities() {
    let temp = tempdir().expect("tempdir");
    let config = ArtransConfig::new(0, ArtransPaths::from_base_dir(temp.path()).expect("paths"));
    let database = bootstrap::initialize(&config).expect("bootstrap").database;

    import(&database, ImportTarget::default(), THREAD);
    import(&database, ImportTarget::default(), THREAD);

    database
        .with_repositories(|repos| {
            let comments = repos.comments().list()?;
            assert_eq!(comments.len(), 4);
            assert_eq!(repos.users().list()?.len(), 2);
            assert_eq!(repos.pages().list_for_site("Blog")?.len(), 1);

            // Each run's reply points into its own run.
            let seconds: Vec<_> = comments.iter().filter(|c| c.content == "second").collect();
            for reply in seconds {
                let parent = comments.iter().find(|c| c.id == reply.rid).unwrap();
                assert_eq!(parent.content, "first");
                assert!(parent.id < reply.id);
            }
            Ok(())
        })
        .expect("inspect");
}

#[test]
fn target_overrides_rehome_pages() {
    let database = Database::open_in_memory().expect("db");
    let target = ImportTarget::new(
        Some("Mirror".into()),
        Some("https://mirror.example.org".into()),
    );
    let report = import(&database, target, THREAD);
    assert_eq!(report.imported, 2);

    database
        .with_repositories(|repos| {
            let site = repos.sites().get_by_name("Mirror")?.expect("site created");
            assert_eq!(site.urls, "https://mirror.example.org");
            assert!(repos.sites().get_by_name("Blog")?.is_none());
            let pages = repos.pages().list_for_site("Mirror")?;
            assert_eq!(pages.len(), 1);
            assert_eq!(pages[0].key, "https://mirror.example.org/posts/1");
            Ok(())
        })
        .expect("inspect");
}
