use super::*;

#[test]
fn test_service_config_lands_where_resolver_looks() -> io::Result<()> {
    let fixture = ConfigDirFixture::new()?;

    let path = fixture.write_service_config("hatchery", "{}")?;

    assert_eq!(path, fixture.path().join("hatchery.tests.cfg.json"));
    assert_eq!(path, fixture.resolver().config_path("hatchery"));
    assert_eq!(fs::read_to_string(&path)?, "{}");
    Ok(())
}

#[test]
fn test_service_map_is_written_as_json_object() -> io::Result<()> {
    let fixture = ConfigDirFixture::new()?;
    let values = HashMap::from([("redisHost".to_string(), "localhost:6379".to_string())]);

    let path = fixture.write_service_map("api", &values)?;

    let parsed: HashMap<String, String> = serde_json::from_str(&fs::read_to_string(path)?)?;
    assert_eq!(parsed, values);
    Ok(())
}

#[test]
fn test_fixtures_are_isolated_and_cleaned_up() -> io::Result<()> {
    let first = ConfigDirFixture::new()?;
    let second = ConfigDirFixture::new()?;
    assert_ne!(first.path(), second.path());

    first.write_file("nested/dir/file.txt", "content")?;
    assert!(first.path().join("nested/dir/file.txt").is_file());
    assert!(!second.path().join("nested/dir/file.txt").exists());

    let root = first.path().to_path_buf();
    drop(first);
    assert!(!root.exists());
    Ok(())
}
