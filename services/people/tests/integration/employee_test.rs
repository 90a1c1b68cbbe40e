use rust_decimal::Decimal;

use hrm_domain::employee::EmployeeStatus;
use hrm_domain::pagination::PageRequest;
use hrm_domain::role::RoleName;
use hrm_people::domain::types::{AccountFields, AccountPatch, ContactFields, EmployeeChanges};
use hrm_people::error::PeopleServiceError;
use hrm_people::usecase::credential::verify_password;
use hrm_people::usecase::employee::{
    AccountRef, CreateEmployeeInput, CreateEmployeeUseCase, DeleteEmployeeUseCase,
    ListEmployeesUseCase, UpdateEmployeeInput, UpdateEmployeeUseCase,
};

use crate::helpers::{MemoryDb, date, employee_fields};

fn create_usecase(db: &MemoryDb) -> CreateEmployeeUseCase<MemoryDb, MemoryDb, MemoryDb, MemoryDb> {
    CreateEmployeeUseCase {
        accounts: db.clone(),
        employees: db.clone(),
        departments: db.clone(),
        scope: db.clone(),
    }
}

fn update_usecase(db: &MemoryDb) -> UpdateEmployeeUseCase<MemoryDb, MemoryDb, MemoryDb, MemoryDb> {
    UpdateEmployeeUseCase {
        accounts: db.clone(),
        employees: db.clone(),
        departments: db.clone(),
        scope: db.clone(),
    }
}

fn provision(name: &str, email: &str, password: Option<&str>) -> AccountRef {
    AccountRef::Provision(AccountFields {
        name: name.to_owned(),
        email: email.to_owned(),
        password: password.map(str::to_owned),
    })
}

fn validation_errors(err: PeopleServiceError) -> hrm_people::error::FieldErrors {
    match err {
        PeopleServiceError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ── CreateEmployee ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_provision_account_and_employee_from_email() {
    let db = MemoryDb::new();
    db.seed_department(1, "Engineering");

    let record = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("A", "a@x.com", Some("hunter22")),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();

    let snap = db.snapshot();
    assert_eq!(snap.accounts.len(), 1);
    assert_eq!(snap.employees.len(), 1);
    let account = &snap.accounts[0];
    assert_eq!(record.account_id, account.id);
    assert_eq!(account.email, "a@x.com");
    assert!(verify_password("hunter22", &account.password_hash));
    assert_eq!(snap.roles, vec![(account.id, RoleName::Employee)]);
}

#[tokio::test]
async fn should_generate_credential_when_none_supplied() {
    let db = MemoryDb::new();
    db.seed_department(1, "Engineering");

    create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("A", "a@x.com", None),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();

    let hash = db.snapshot().accounts[0].password_hash.clone();
    assert!(hash.starts_with("$argon2"));
}

#[tokio::test]
async fn should_link_existing_account_without_creating_one() {
    let db = MemoryDb::new();
    db.seed_account(7, "Seven", "seven@x.com");
    db.seed_department(2, "Platform");

    let record = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: AccountRef::Existing(7),
            employee: employee_fields(2, "Dev", 50_000),
        })
        .await
        .unwrap();

    assert_eq!(record.account_id, 7);
    assert_eq!(record.department_id, 2);
    assert_eq!(record.position, "Dev");
    assert_eq!(record.salary, Decimal::new(50_000, 0));
    assert_eq!(record.status, EmployeeStatus::Active);
    assert_eq!(db.snapshot().accounts.len(), 1);
    // linking an existing account grants no role
    assert!(db.snapshot().roles.is_empty());
}

#[tokio::test]
async fn should_reuse_account_registered_under_email() {
    let db = MemoryDb::new();
    let existing = db.seed_account(3, "Old Name", "a@x.com");
    db.seed_department(1, "Engineering");

    let record = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("New Name", "a@x.com", None),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();

    let snap = db.snapshot();
    assert_eq!(record.account_id, existing.id);
    assert_eq!(snap.accounts.len(), 1);
    assert_eq!(snap.accounts[0].name, "Old Name");
    assert_eq!(snap.accounts[0].password_hash, existing.password_hash);
}

#[tokio::test]
async fn should_revive_soft_deleted_employee_with_new_fields() {
    let db = MemoryDb::new();
    db.seed_department(1, "Engineering");
    db.seed_department(2, "Sales");

    let first = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("A", "a@x.com", None),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();
    DeleteEmployeeUseCase { scope: db.clone() }
        .execute(first.id)
        .await
        .unwrap();

    let mut fields = employee_fields(2, "Lead", 90_000);
    fields.hire_date = date(2025, 3, 1);
    fields.status = EmployeeStatus::OnLeave;
    let revived = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("A", "a@x.com", None),
            employee: fields,
        })
        .await
        .unwrap();

    assert_eq!(revived.id, first.id);
    assert!(revived.deleted_at.is_none());
    assert_eq!(revived.department_id, 2);
    assert_eq!(revived.position, "Lead");
    assert_eq!(revived.salary, Decimal::new(90_000, 0));
    assert_eq!(revived.hire_date, date(2025, 3, 1));
    assert_eq!(revived.status, EmployeeStatus::OnLeave);

    let snap = db.snapshot();
    assert_eq!(snap.accounts.len(), 1);
    assert_eq!(snap.employees.len(), 1);
}

#[tokio::test]
async fn should_keep_contact_fields_absent_from_revival_input() {
    let db = MemoryDb::new();
    db.seed_department(1, "Engineering");

    let mut fields = employee_fields(1, "P", 1);
    fields.contact = ContactFields {
        phone: Some("555-0100".into()),
        city: Some("Lisbon".into()),
        ..ContactFields::default()
    };
    let first = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("A", "a@x.com", None),
            employee: fields,
        })
        .await
        .unwrap();
    DeleteEmployeeUseCase { scope: db.clone() }
        .execute(first.id)
        .await
        .unwrap();

    let mut fields = employee_fields(1, "P", 1);
    fields.contact.city = Some("Porto".into());
    let revived = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("A", "a@x.com", None),
            employee: fields,
        })
        .await
        .unwrap();

    assert_eq!(revived.contact.phone.as_deref(), Some("555-0100"));
    assert_eq!(revived.contact.city.as_deref(), Some("Porto"));
}

#[tokio::test]
async fn should_reject_unknown_account_and_department() {
    let db = MemoryDb::new();

    let err = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: AccountRef::Existing(99),
            employee: employee_fields(5, "P", 1),
        })
        .await
        .unwrap_err();

    let errors = validation_errors(err);
    assert_eq!(errors.get("user_id"), Some(&["does not exist".to_owned()][..]));
    assert_eq!(
        errors.get("department_id"),
        Some(&["does not exist".to_owned()][..])
    );
    assert!(db.snapshot().employees.is_empty());
}

#[tokio::test]
async fn should_reject_account_with_active_employee() {
    let db = MemoryDb::new();
    db.seed_account(7, "Seven", "seven@x.com");
    db.seed_department(1, "Engineering");
    let uc = create_usecase(&db);
    uc.execute(CreateEmployeeInput {
        account: AccountRef::Existing(7),
        employee: employee_fields(1, "P", 1),
    })
    .await
    .unwrap();

    let by_id = uc
        .execute(CreateEmployeeInput {
            account: AccountRef::Existing(7),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap_err();
    assert_eq!(
        validation_errors(by_id).get("user_id"),
        Some(&["has already been taken".to_owned()][..])
    );

    let by_email = uc
        .execute(CreateEmployeeInput {
            account: provision("Seven", "seven@x.com", None),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap_err();
    assert_eq!(
        validation_errors(by_email).get("email"),
        Some(&["already associated with an active employee".to_owned()][..])
    );
}

#[tokio::test]
async fn should_fail_as_invariant_violation_when_active_row_appears_after_checks() {
    let db = MemoryDb::new();
    db.seed_account(7, "Seven", "seven@x.com");
    db.seed_department(1, "Engineering");
    create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: AccountRef::Existing(7),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();

    // Pre-transaction checks see a store without the active row.
    let stale = MemoryDb::new();
    stale.seed_account(7, "Seven", "seven@x.com");
    let uc = CreateEmployeeUseCase {
        accounts: stale.clone(),
        employees: stale,
        departments: db.clone(),
        scope: db.clone(),
    };
    let err = uc
        .execute(CreateEmployeeInput {
            account: AccountRef::Existing(7),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PeopleServiceError::ActiveEmployeeExists { account_id: 7 }
    ));
    assert_eq!(db.snapshot().employees.len(), 1);
}

#[tokio::test]
async fn should_roll_back_provisioned_account_when_employee_insert_fails() {
    let db = MemoryDb::new();
    db.seed_department(1, "Engineering");
    db.fail_employee_writes();

    let err = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("A", "a@x.com", None),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PeopleServiceError::Internal(_)));
    let snap = db.snapshot();
    assert!(snap.accounts.is_empty());
    assert!(snap.roles.is_empty());
    assert!(snap.employees.is_empty());
}

// ── UpdateEmployee ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_change_only_account_name() {
    let db = MemoryDb::new();
    db.seed_account(7, "Seven", "seven@x.com");
    db.seed_department(1, "Engineering");
    let record = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: AccountRef::Existing(7),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();
    let before = db.snapshot().accounts[0].clone();

    let updated = update_usecase(&db)
        .execute(
            record.id,
            UpdateEmployeeInput {
                account: AccountPatch {
                    name: Some("X".into()),
                    email: None,
                },
                employee: EmployeeChanges::default(),
            },
        )
        .await
        .unwrap();

    let after = db.snapshot().accounts[0].clone();
    assert_eq!(after.name, "X");
    assert_eq!(after.email, before.email);
    assert_eq!(after.password_hash, before.password_hash);
    assert_eq!(updated.position, record.position);
}

#[tokio::test]
async fn should_apply_account_and_employee_changes_together() {
    let db = MemoryDb::new();
    db.seed_account(7, "Seven", "seven@x.com");
    db.seed_department(1, "Engineering");
    db.seed_department(2, "Sales");
    let record = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: AccountRef::Existing(7),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();

    let updated = update_usecase(&db)
        .execute(
            record.id,
            UpdateEmployeeInput {
                account: AccountPatch {
                    name: None,
                    email: Some("new@x.com".into()),
                },
                employee: EmployeeChanges {
                    department_id: Some(2),
                    phone: Some(Some("123".into())),
                    ..EmployeeChanges::default()
                },
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.department_id, 2);
    assert_eq!(updated.contact.phone.as_deref(), Some("123"));
    assert_eq!(db.snapshot().accounts[0].email, "new@x.com");
}

#[tokio::test]
async fn should_roll_back_account_change_when_employee_update_fails() {
    let db = MemoryDb::new();
    db.seed_account(7, "Seven", "seven@x.com");
    db.seed_department(1, "Engineering");
    let record = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: AccountRef::Existing(7),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();
    db.fail_employee_writes();

    let err = update_usecase(&db)
        .execute(
            record.id,
            UpdateEmployeeInput {
                account: AccountPatch {
                    name: Some("X".into()),
                    email: None,
                },
                employee: EmployeeChanges {
                    position: Some("Lead".into()),
                    ..EmployeeChanges::default()
                },
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PeopleServiceError::Internal(_)));
    assert_eq!(db.snapshot().accounts[0].name, "Seven");
}

#[tokio::test]
async fn should_reject_email_owned_by_another_account() {
    let db = MemoryDb::new();
    db.seed_account(7, "Seven", "seven@x.com");
    db.seed_account(8, "Eight", "eight@x.com");
    db.seed_department(1, "Engineering");
    let record = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: AccountRef::Existing(7),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();

    let err = update_usecase(&db)
        .execute(
            record.id,
            UpdateEmployeeInput {
                account: AccountPatch {
                    name: None,
                    email: Some("eight@x.com".into()),
                },
                employee: EmployeeChanges::default(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(
        validation_errors(err).get("email"),
        Some(&["has already been taken".to_owned()][..])
    );
}

#[tokio::test]
async fn should_return_not_found_when_updating_missing_employee() {
    let db = MemoryDb::new();
    let err = update_usecase(&db)
        .execute(42, UpdateEmployeeInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PeopleServiceError::EmployeeNotFound));
}

// ── DeleteEmployee ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_soft_delete_employee_and_keep_account() {
    let db = MemoryDb::new();
    db.seed_department(1, "Engineering");
    let record = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("A", "a@x.com", None),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();
    let account_before = db.snapshot().accounts[0].clone();

    DeleteEmployeeUseCase { scope: db.clone() }
        .execute(record.id)
        .await
        .unwrap();

    let snap = db.snapshot();
    assert!(snap.employees[0].deleted_at.is_some());
    assert_eq!(snap.accounts, vec![account_before]);

    let listed = ListEmployeesUseCase { repo: db.clone() }
        .execute(PageRequest::default())
        .await
        .unwrap();
    assert!(listed.data.is_empty());
    assert_eq!(listed.meta.total, 0);
}

#[tokio::test]
async fn should_return_not_found_when_deleting_twice() {
    let db = MemoryDb::new();
    db.seed_department(1, "Engineering");
    let record = create_usecase(&db)
        .execute(CreateEmployeeInput {
            account: provision("A", "a@x.com", None),
            employee: employee_fields(1, "P", 1),
        })
        .await
        .unwrap();
    let uc = DeleteEmployeeUseCase { scope: db.clone() };
    uc.execute(record.id).await.unwrap();

    let err = uc.execute(record.id).await.unwrap_err();
    assert!(matches!(err, PeopleServiceError::EmployeeNotFound));
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_create_twice_with_delete_between_revives_same_row() {
    let db = MemoryDb::new();
    db.seed_department(1, "Engineering");
    let uc = create_usecase(&db);
    let input = || CreateEmployeeInput {
        account: provision("A", "a@x.com", None),
        employee: employee_fields(1, "P", 1),
    };

    let first = uc.execute(input()).await.unwrap();
    DeleteEmployeeUseCase { scope: db.clone() }
        .execute(first.id)
        .await
        .unwrap();
    let second = uc.execute(input()).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.account_id, first.account_id);
    assert_eq!(db.snapshot().accounts.len(), 1);
}
