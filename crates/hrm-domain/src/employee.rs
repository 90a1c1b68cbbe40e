//! Employee domain types.

wire_enum! {
    /// Employment status of an HR profile.
    EmployeeStatus as "employee status" {
        Active => "active",
        Inactive => "inactive",
        OnLeave => "on_leave",
        Terminated => "terminated",
    }
}
