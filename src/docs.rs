use utoipa::OpenApi;

use kaayjang_core::PaginationParams;
use kaayjang_models::classes::{
    Class, ClassDetails, ClassStatistics, ClassSummary, ClassWithCount, ClassWithRelations,
    ClassWithTrack, CreateClassDto, UpdateClassDto,
};
use kaayjang_models::levels::{CreateLevelDto, Level, LevelClassCount, LevelDetails, UpdateLevelDto};
use kaayjang_models::students::{CreateStudentDto, Student, StudentWithClass, UpdateStudentDto};
use kaayjang_models::tracks::{
    CreateTrackDto, Track, TrackClassCount, TrackDetails, TrackSummary, UpdateTrackDto,
};

use crate::modules::health::{HealthStatus, Welcome};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::welcome,
        crate::modules::health::health,
        crate::modules::levels::controller::get_levels,
        crate::modules::levels::controller::get_level_by_id,
        crate::modules::levels::controller::create_level,
        crate::modules::levels::controller::update_level,
        crate::modules::levels::controller::delete_level,
        crate::modules::levels::controller::get_level_by_label,
        crate::modules::levels::controller::get_level_details,
        crate::modules::levels::controller::get_level_tracks,
        crate::modules::levels::controller::get_level_classes,
        crate::modules::tracks::controller::get_tracks,
        crate::modules::tracks::controller::get_track_by_id,
        crate::modules::tracks::controller::create_track,
        crate::modules::tracks::controller::update_track,
        crate::modules::tracks::controller::delete_track,
        crate::modules::tracks::controller::get_track_by_label,
        crate::modules::tracks::controller::get_track_details,
        crate::modules::tracks::controller::get_track_classes,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class_by_id,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::classes::controller::get_class_by_code,
        crate::modules::classes::controller::get_class_statistics,
        crate::modules::classes::controller::get_class_details,
        crate::modules::classes::controller::get_class_students,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student_by_id,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::get_student_by_matricule,
        crate::modules::students::controller::get_student_details,
    ),
    components(
        schemas(
            HealthStatus,
            Welcome,
            PaginationParams,
            Level,
            CreateLevelDto,
            UpdateLevelDto,
            LevelDetails,
            LevelClassCount,
            Track,
            CreateTrackDto,
            UpdateTrackDto,
            TrackSummary,
            TrackDetails,
            TrackClassCount,
            Class,
            CreateClassDto,
            UpdateClassDto,
            ClassWithCount,
            ClassWithTrack,
            ClassWithRelations,
            ClassSummary,
            ClassDetails,
            ClassStatistics,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            StudentWithClass,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and welcome endpoints"),
        (name = "Niveaux", description = "Level management endpoints"),
        (name = "Filieres", description = "Track management endpoints"),
        (name = "Classes", description = "Class management endpoints"),
        (name = "Etudiants", description = "Student management endpoints")
    ),
    info(
        title = "Kaayjang API",
        version = "0.1.0",
        description = "School administration REST API: levels, tracks, classes and students.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/niveaux",
            "/api/filieres/{id}",
            "/api/classes/statistics",
            "/api/etudiants/matricule/{matricule}",
            "/api/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
