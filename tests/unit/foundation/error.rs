use super::*;

#[test]
fn each_category_renders_its_prefix() {
    let cases = [
        (SpotDiffError::validation("bad radius"), "validation error: bad radius"),
        (SpotDiffError::media("probe failed"), "media error: probe failed"),
        (SpotDiffError::render("pipe closed"), "render error: pipe closed"),
        (SpotDiffError::publish("no token"), "publish error: no token"),
        (SpotDiffError::serde("eof"), "serialization error: eof"),
    ];
    for (err, want) in cases {
        assert_eq!(err.to_string(), want);
    }
}

#[test]
fn anyhow_errors_convert_transparently() {
    fn fails() -> SpotDiffResult<()> {
        let io: anyhow::Result<()> = Err(anyhow::anyhow!("disk full"));
        io?;
        Ok(())
    }
    let err = fails().unwrap_err();
    assert!(matches!(err, SpotDiffError::Other(_)));
    assert_eq!(err.to_string(), "disk full");
}
