use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crew {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub work_type: Option<String>,
    pub leader: Option<String>,
    pub profile_pic: Option<String>,
    pub status: String,
    pub crew_members: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}
