//! Operation kinds and weighted selection

use std::fmt;

/// One simulated API operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    CreatePet,
    UpdatePet,
    DeletePet,
    GetPet,
    FindPetsByStatus,
    FindPetsByTags,
    CreateUser,
    UpdateUser,
    DeleteUser,
    GetUser,
    LoginUser,
    LogoutUser,
    CreateOrder,
    GetOrder,
    DeleteOrder,
    GetInventory,
}

impl OpKind {
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::CreatePet => "create_pet",
            OpKind::UpdatePet => "update_pet",
            OpKind::DeletePet => "delete_pet",
            OpKind::GetPet => "get_pet",
            OpKind::FindPetsByStatus => "find_pets_by_status",
            OpKind::FindPetsByTags => "find_pets_by_tags",
            OpKind::CreateUser => "create_user",
            OpKind::UpdateUser => "update_user",
            OpKind::DeleteUser => "delete_user",
            OpKind::GetUser => "get_user",
            OpKind::LoginUser => "login_user",
            OpKind::LogoutUser => "logout_user",
            OpKind::CreateOrder => "create_order",
            OpKind::GetOrder => "get_order",
            OpKind::DeleteOrder => "delete_order",
            OpKind::GetInventory => "get_inventory",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Uniform pick over a list with duplicate entries acting as weights.
pub struct WeightedTable {
    entries: Vec<OpKind>,
}

impl WeightedTable {
    /// The standard traffic mix: every operation once, with extra weight
    /// on pet lookups, status searches and inventory checks.
    pub fn standard() -> Self {
        let mut entries = vec![
            OpKind::CreatePet,
            OpKind::UpdatePet,
            OpKind::DeletePet,
            OpKind::GetPet,
            OpKind::FindPetsByStatus,
            OpKind::FindPetsByTags,
            OpKind::CreateUser,
            OpKind::UpdateUser,
            OpKind::DeleteUser,
            OpKind::GetUser,
            OpKind::LoginUser,
            OpKind::LogoutUser,
            OpKind::CreateOrder,
            OpKind::GetOrder,
            OpKind::DeleteOrder,
            OpKind::GetInventory,
        ];
        entries.extend([
            OpKind::GetPet,
            OpKind::GetPet,
            OpKind::FindPetsByStatus,
            OpKind::FindPetsByStatus,
            OpKind::GetInventory,
            OpKind::GetInventory,
        ]);
        Self { entries }
    }

    pub fn from_entries(entries: Vec<OpKind>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weight_of(&self, op: OpKind) -> usize {
        self.entries.iter().filter(|entry| **entry == op).count()
    }

    pub fn pick(&self) -> OpKind {
        self.entries[fastrand::usize(..self.entries.len())]
    }
}

impl Default for WeightedTable {
    fn default() -> Self {
        Self::standard()
    }
}
