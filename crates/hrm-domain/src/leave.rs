//! Leave request domain types.

wire_enum! {
    /// Category of a leave request.
    LeaveType as "leave type" {
        Annual => "annual",
        Sick => "sick",
        Personal => "personal",
        Emergency => "emergency",
        Unpaid => "unpaid",
    }
}

wire_enum! {
    /// Review state of a leave request. Changed by plain assignment.
    LeaveStatus as "leave status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

impl Default for LeaveStatus {
    fn default() -> Self {
        Self::Pending
    }
}
