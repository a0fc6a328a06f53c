use super::*;

fn sample() -> Manifest {
    Manifest::from_json_str(
        r#"{
            "plans": ["assets/plans/a.png", "assets/plans/b.png"],
            "siteplans": ["s1.jpg", "/abs/s2.jpg"],
            "Diagrams": ["d.png"],
            "empty": []
        }"#,
    )
    .unwrap()
}

#[test]
fn lookup_tries_key_variants() {
    let m = sample();
    assert_eq!(m.lookup("plans").map(<[String]>::len), Some(2));
    assert_eq!(m.lookup("sitePlans").map(<[String]>::len), Some(2));
    assert_eq!(m.lookup("diagrams").map(<[String]>::len), Some(1));
    assert!(m.lookup("mockups").is_none());
    assert!(m.lookup("empty").is_none());
}

#[test]
fn capitalize_lowercases_the_tail() {
    assert_eq!(capitalize("sitePlans"), "Siteplans");
    assert_eq!(capitalize(""), "");
}

#[test]
fn plan_resolves_paths_and_names_outputs() {
    let plan = sample().plan(
        &["sitePlans".to_string(), "mockups".to_string()],
        Path::new("/data"),
        Path::new("out"),
    );
    assert_eq!(plan.missing, vec!["mockups".to_string()]);
    assert_eq!(plan.jobs.len(), 1);
    let job = &plan.jobs[0];
    assert_eq!(job.name, "sitePlans");
    assert_eq!(job.out_path, PathBuf::from("out/siteplans.mp4"));
    assert_eq!(
        job.images,
        vec![PathBuf::from("/data/s1.jpg"), PathBuf::from("/abs/s2.jpg")]
    );
}

#[test]
fn empty_key_list_plans_every_group() {
    let plan = sample().plan(&[], Path::new("."), Path::new("out"));
    let names: Vec<&str> = plan.jobs.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["Diagrams", "plans", "siteplans"]);
    assert_eq!(plan.missing, vec!["empty".to_string()]);

    let m = sample();
    let all: Vec<&str> = m.group_names().collect();
    assert_eq!(all, vec!["Diagrams", "empty", "plans", "siteplans"]);
}

#[test]
fn malformed_manifest_is_a_serde_error() {
    let err = Manifest::from_json_str(r#"{"plans": "not-a-list"}"#).unwrap_err();
    assert!(matches!(err, MorphError::Serde(_)));
}
