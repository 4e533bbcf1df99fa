use crate::adapter::ContainerAdapter;
use crate::model::{Area, FolderKey, Project};

/// Sidebar folders: one per area, plus Unfiled for projects without one.
///
/// A project that points at an area the sidebar does not know is shown as
/// unfiled rather than hidden.
#[derive(Debug, Clone, Default)]
pub struct SidebarAdapter {
    areas: Vec<String>,
}

impl SidebarAdapter {
    pub fn new<I, S>(areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SidebarAdapter {
            areas: areas.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_areas(areas: &[Area]) -> Self {
        SidebarAdapter::new(areas.iter().map(|a| a.id.clone()))
    }

    fn knows(&self, area: &str) -> bool {
        self.areas.iter().any(|a| a == area)
    }
}

impl ContainerAdapter for SidebarAdapter {
    type Entity = Project;
    type Key = FolderKey;

    fn container_of(&self, project: &Project) -> Option<FolderKey> {
        Some(match &project.area {
            Some(area) if self.knows(area) => FolderKey::Area(area.clone()),
            _ => FolderKey::Unfiled,
        })
    }

    fn assign(&self, project: &mut Project, folder: &FolderKey) {
        project.area = match folder {
            FolderKey::Unfiled => None,
            FolderKey::Area(id) => Some(id.clone()),
        };
    }

    fn declared_containers(&self) -> Vec<FolderKey> {
        let mut folders: Vec<FolderKey> = self.areas.iter().cloned().map(FolderKey::Area).collect();
        folders.push(FolderKey::Unfiled);
        folders
    }

    fn accepts(&self, folder: &FolderKey) -> bool {
        match folder {
            FolderKey::Unfiled => true,
            FolderKey::Area(id) => self.knows(id),
        }
    }
}
